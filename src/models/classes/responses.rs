use serde::Serialize;

use super::entities::ClassEntity;
use crate::lifecycle::ClassAction;
use crate::models::common::PaginationInfo;

// 班级视图：实体 + 当前用户可执行的操作
#[derive(Debug, Clone, Serialize)]
pub struct ClassView {
    #[serde(flatten)]
    pub class: ClassEntity,
    pub available_actions: Vec<ClassAction>,
}

// 班级列表响应
#[derive(Debug, Clone, Serialize)]
pub struct ClassListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<ClassView>,
}
