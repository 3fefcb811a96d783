//! 班级操作的统一处理流程
//!
//! 1. 拉取班级的最新状态
//! 2. 按角色与转换表打开对话框（不合法则直接返回）
//! 3. 校验输入并在进行中表里占位后提交
//! 4. 重新拉取并返回新的视图（删除除外）

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassService;
use crate::errors::Result;
use crate::lifecycle::{ClassAction, available_actions};
use crate::modals::{ActionForm, ClassActionModal};
use crate::models::{ApiResponse, classes::responses::ClassView};
use crate::services::{error_response, require_session};

pub async fn perform_action(
    service: &ClassService,
    request: &HttpRequest,
    class_id: String,
    form: ActionForm,
) -> ActixResult<HttpResponse> {
    let action = form.action();
    match run(service, request, &class_id, form).await {
        Ok(None) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(format!(
            "Class {class_id}: {action} completed"
        )))),
        Ok(Some(view)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            view,
            format!("Class {class_id}: {action} completed"),
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn run(
    service: &ClassService,
    request: &HttpRequest,
    class_id: &str,
    form: ActionForm,
) -> Result<Option<ClassView>> {
    let session = require_session(request)?;
    let client = service.get_client(request)?;
    let inflight = service.get_inflight(request)?;

    let class = client.get_class(&session, class_id).await?;
    let mut modal = ClassActionModal::open(form, &class, &session)?;
    modal
        .submit_with(&*client, &session, &inflight)
        .await?;

    if modal.action() == ClassAction::Delete {
        return Ok(None);
    }

    // 状态以后端为准，提交后重新拉取
    let class = client.get_class(&session, class_id).await?;
    let available_actions = available_actions(&class, session.role);
    Ok(Some(ClassView {
        class,
        available_actions,
    }))
}
