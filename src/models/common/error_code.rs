use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::errors::DashboardError;

// 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,
    DuplicateRequest = 1009,

    // 班级相关
    ClassNotFound = 3000,
    ClassValidationFailed = 3001,
    ClassTransitionNotAllowed = 3002,

    // 后端相关
    BackendUnavailable = 5000,
    BackendRejected = 5001,
}

impl ErrorCode {
    /// 对应的 HTTP 状态码
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::Success => StatusCode::OK,
            ErrorCode::BadRequest | ErrorCode::ClassValidationFailed => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound | ErrorCode::ClassNotFound => StatusCode::NOT_FOUND,
            ErrorCode::DuplicateRequest | ErrorCode::ClassTransitionNotAllowed => {
                StatusCode::CONFLICT
            }
            ErrorCode::BackendUnavailable => StatusCode::BAD_GATEWAY,
            ErrorCode::BackendRejected => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<&DashboardError> for ErrorCode {
    fn from(err: &DashboardError) -> Self {
        match err {
            DashboardError::Network(_) => ErrorCode::BackendUnavailable,
            DashboardError::Backend(_) => ErrorCode::BackendRejected,
            DashboardError::NotFound(_) => ErrorCode::ClassNotFound,
            DashboardError::Authentication(_) => ErrorCode::Unauthorized,
            DashboardError::Authorization(_) => ErrorCode::Forbidden,
            DashboardError::Validation(_) => ErrorCode::ClassValidationFailed,
            DashboardError::IllegalTransition(_) => ErrorCode::ClassTransitionNotAllowed,
            DashboardError::DuplicateRequest(_) => ErrorCode::DuplicateRequest,
            DashboardError::Serialization(_) | DashboardError::Configuration(_) => {
                ErrorCode::InternalServerError
            }
        }
    }
}
