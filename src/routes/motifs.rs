use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::motifs::requests::MotifRequest;
use crate::models::users::entities::UserRole;
use crate::services::MotifService;

// 懒加载的全局 MOTIF_SERVICE 实例
static MOTIF_SERVICE: Lazy<MotifService> = Lazy::new(MotifService::new_lazy);

pub async fn list_motifs(req: HttpRequest) -> ActixResult<HttpResponse> {
    MOTIF_SERVICE.list_motifs(&req).await
}

pub async fn create_motif(
    req: HttpRequest,
    motif: web::Json<MotifRequest>,
) -> ActixResult<HttpResponse> {
    MOTIF_SERVICE.create_motif(&req, motif.into_inner()).await
}

pub async fn update_motif(
    req: HttpRequest,
    motif_id: web::Path<String>,
    motif: web::Json<MotifRequest>,
) -> ActixResult<HttpResponse> {
    MOTIF_SERVICE
        .update_motif(&req, motif_id.into_inner(), motif.into_inner())
        .await
}

pub async fn delete_motif(req: HttpRequest, motif_id: web::Path<String>) -> ActixResult<HttpResponse> {
    MOTIF_SERVICE.delete_motif(&req, motif_id.into_inner()).await
}

// 配置路由
pub fn configure_motifs_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/motifs")
            // 驳回理由供审核时选择，目录维护仅管理员可用
            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles()))
            // 后注册的中间件先执行，会话必须先于角色检查建立
            .wrap(middlewares::RequireSession)
            .service(
                web::resource("").route(web::get().to(list_motifs)).route(
                    web::post()
                        .to(create_motif)
                        .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                ),
            )
            .service(
                web::resource("/{motif_id}")
                    .route(web::put().to(update_motif))
                    .route(web::delete().to(delete_motif))
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
            ),
    );
}
