use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::modals::ActionForm;
use crate::models::classes::requests::{
    AccessRequest, AssignModeratorRequest, ClassQueryParams, CreateClassRequest,
    DeactivateClassRequest, PublicationRightsRequest, RejectClassRequest, UpdateClassRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::ClassService;

// 懒加载的全局 CLASS_SERVICE 实例
static CLASS_SERVICE: Lazy<ClassService> = Lazy::new(ClassService::new_lazy);

// HTTP处理程序
pub async fn list_classes(
    req: HttpRequest,
    query: web::Query<ClassQueryParams>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.list_classes(&req, query.into_inner()).await
}

pub async fn list_pending_classes(
    req: HttpRequest,
    query: web::Query<ClassQueryParams>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .list_pending_classes(&req, query.into_inner())
        .await
}

pub async fn create_class(
    req: HttpRequest,
    class_data: web::Json<CreateClassRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .create_class(&req, class_data.into_inner())
        .await
}

pub async fn redeem_access(
    req: HttpRequest,
    access: web::Json<AccessRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.redeem_access(&req, access.into_inner()).await
}

pub async fn get_class(req: HttpRequest, class_id: web::Path<String>) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.get_class(&req, class_id.into_inner()).await
}

pub async fn update_class(
    req: HttpRequest,
    class_id: web::Path<String>,
    update_data: web::Json<UpdateClassRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .perform_action(&req, class_id.into_inner(), update_data.into_inner().into())
        .await
}

pub async fn delete_class(req: HttpRequest, class_id: web::Path<String>) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .perform_action(&req, class_id.into_inner(), ActionForm::Delete)
        .await
}

pub async fn approve_class(req: HttpRequest, class_id: web::Path<String>) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .perform_action(&req, class_id.into_inner(), ActionForm::Approve)
        .await
}

pub async fn reject_class(
    req: HttpRequest,
    class_id: web::Path<String>,
    body: web::Json<RejectClassRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .perform_action(&req, class_id.into_inner(), body.into_inner().into())
        .await
}

pub async fn deactivate_class(
    req: HttpRequest,
    class_id: web::Path<String>,
    body: web::Json<DeactivateClassRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .perform_action(&req, class_id.into_inner(), body.into_inner().into())
        .await
}

pub async fn assign_moderator(
    req: HttpRequest,
    class_id: web::Path<String>,
    body: web::Json<AssignModeratorRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .perform_action(&req, class_id.into_inner(), body.into_inner().into())
        .await
}

pub async fn remove_moderator(
    req: HttpRequest,
    class_id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .perform_action(&req, class_id.into_inner(), ActionForm::RemoveModerator)
        .await
}

pub async fn update_publication_rights(
    req: HttpRequest,
    class_id: web::Path<String>,
    body: web::Json<PublicationRightsRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .perform_action(&req, class_id.into_inner(), body.into_inner().into())
        .await
}

pub async fn activation_history(
    req: HttpRequest,
    class_id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .activation_history(&req, class_id.into_inner())
        .await
}

// 配置路由
pub fn configure_classes_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/classes")
            .wrap(middlewares::RequireSession)
            .service(
                // 所有角色可查看列表，可执行的操作按角色计算
                web::resource("").route(web::get().to(list_classes)).route(
                    web::post()
                        .to(create_class)
                        // 管理员与教师提交新班级
                        .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                ),
            )
            .service(
                web::resource("/pending").route(
                    web::get()
                        .to(list_pending_classes)
                        // 待审批队列仅管理员可见
                        .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                ),
            )
            .service(
                // 家长、学生通过激活码申请加入班级
                web::resource("/access-requests").route(web::post().to(redeem_access)),
            )
            .service(
                web::resource("/{class_id}")
                    .route(web::get().to(get_class))
                    .route(
                        web::put()
                            .to(update_class)
                            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_class)
                            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                    ),
            )
            .service(
                web::resource("/{class_id}/approve").route(
                    web::post()
                        .to(approve_class)
                        .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                ),
            )
            .service(
                web::resource("/{class_id}/reject").route(
                    web::post()
                        .to(reject_class)
                        .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                ),
            )
            .service(
                web::resource("/{class_id}/deactivate").route(
                    web::post()
                        .to(deactivate_class)
                        .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                ),
            )
            .service(
                web::resource("/{class_id}/moderator")
                    .route(web::put().to(assign_moderator))
                    .route(web::delete().to(remove_moderator))
                    // 版主指派与移除仅管理员可用
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
            )
            .service(
                web::resource("/{class_id}/publication-rights").route(
                    web::put()
                        .to(update_publication_rights)
                        .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                ),
            )
            .service(
                web::resource("/{class_id}/activation-history").route(
                    web::get()
                        .to(activation_history)
                        .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                ),
            ),
    );
}
