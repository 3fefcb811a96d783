pub mod classes;
pub mod motifs;
pub mod system;

pub use classes::ClassService;
pub use motifs::MotifService;
pub use system::SystemService;

use actix_web::{HttpRequest, HttpResponse};
use tracing::{debug, warn};

use crate::errors::DashboardError;
use crate::middlewares::RequireSession;
use crate::models::{ApiResponse, ErrorCode, users::entities::Session};

/// 将错误渲染为带对应状态码的统一响应
pub(crate) fn error_response(err: &DashboardError) -> HttpResponse {
    if err.is_local() {
        debug!("Request refused before reaching backend: {}", err);
    } else {
        warn!("Request failed: {}", err);
    }
    let code = ErrorCode::from(err);
    HttpResponse::build(code.status()).json(ApiResponse::from_error(err))
}

/// 从请求扩展中取出会话
pub(crate) fn require_session(request: &HttpRequest) -> Result<Session, DashboardError> {
    RequireSession::extract_session(request)
        .ok_or_else(|| DashboardError::authentication("Unauthorized: missing session"))
}

/// 从 app_data 中取出共享组件
pub(crate) fn app_data<T: 'static>(request: &HttpRequest, what: &str) -> Result<T, DashboardError>
where
    T: Clone,
{
    request
        .app_data::<actix_web::web::Data<T>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| DashboardError::configuration(format!("{what} not found in app data")))
}
