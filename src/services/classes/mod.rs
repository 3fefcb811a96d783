pub mod access;
pub mod actions;
pub mod create;
pub mod get;
pub mod list;

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::client::ClassLifecycleClient;
use crate::errors::Result;
use crate::modals::{ActionForm, InFlightRequests};
use crate::models::classes::{
    entities::ClassState,
    requests::{AccessRequest, ClassQueryParams, CreateClassRequest},
};

pub struct ClassService {
    client: Option<Arc<dyn ClassLifecycleClient>>,
}

impl ClassService {
    pub fn new_lazy() -> Self {
        Self { client: None }
    }

    pub(crate) fn get_client(&self, request: &HttpRequest) -> Result<Arc<dyn ClassLifecycleClient>> {
        match &self.client {
            Some(client) => Ok(client.clone()),
            None => super::app_data::<Arc<dyn ClassLifecycleClient>>(request, "Backend client"),
        }
    }

    pub(crate) fn get_inflight(&self, request: &HttpRequest) -> Result<InFlightRequests> {
        super::app_data::<InFlightRequests>(request, "In-flight request map")
    }

    // 获取班级列表（搜索、筛选、排序、分页）
    pub async fn list_classes(
        &self,
        request: &HttpRequest,
        query: ClassQueryParams,
    ) -> ActixResult<HttpResponse> {
        list::list_classes(self, request, query, None).await
    }

    // 待审批队列
    pub async fn list_pending_classes(
        &self,
        request: &HttpRequest,
        query: ClassQueryParams,
    ) -> ActixResult<HttpResponse> {
        list::list_classes(self, request, query, Some(ClassState::EnAttenteApprobation)).await
    }

    // 提交新班级
    pub async fn create_class(
        &self,
        request: &HttpRequest,
        class_data: CreateClassRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_class(self, request, class_data).await
    }

    // 班级详情及可执行操作
    pub async fn get_class(&self, request: &HttpRequest, class_id: String) -> ActixResult<HttpResponse> {
        get::get_class(self, request, class_id).await
    }

    // 激活历史
    pub async fn activation_history(
        &self,
        request: &HttpRequest,
        class_id: String,
    ) -> ActixResult<HttpResponse> {
        get::activation_history(self, request, class_id).await
    }

    // 对班级执行一次操作（审批、驳回、停用、编辑、删除、版主、发布权限）
    pub async fn perform_action(
        &self,
        request: &HttpRequest,
        class_id: String,
        form: ActionForm,
    ) -> ActixResult<HttpResponse> {
        actions::perform_action(self, request, class_id, form).await
    }

    // 兑换访问令牌
    pub async fn redeem_access(
        &self,
        request: &HttpRequest,
        access: AccessRequest,
    ) -> ActixResult<HttpResponse> {
        access::redeem_access(self, request, access).await
    }
}
