pub mod classes;
pub mod common;
pub mod motifs;
pub mod users;

pub use common::{ApiResponse, ErrorCode, PaginationInfo, PaginationQuery};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
