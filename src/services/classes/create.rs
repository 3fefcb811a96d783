use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use tracing::info;

use super::ClassService;
use crate::errors::Result;
use crate::lifecycle::available_actions;
use crate::models::{
    ApiResponse,
    classes::{requests::CreateClassRequest, responses::ClassView},
};
use crate::services::{error_response, require_session};

pub async fn create_class(
    service: &ClassService,
    request: &HttpRequest,
    class_data: CreateClassRequest,
) -> ActixResult<HttpResponse> {
    match submit_draft(service, request, class_data).await {
        Ok(view) => Ok(HttpResponse::Created().json(ApiResponse::success(
            view,
            "Class submitted for approval",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn submit_draft(
    service: &ClassService,
    request: &HttpRequest,
    class_data: CreateClassRequest,
) -> Result<ClassView> {
    let session = require_session(request)?;
    class_data.validate()?;
    let client = service.get_client(request)?;

    let draft = class_data.into_draft(Utc::now());
    let class = client.create_class(&session, &draft).await?;
    info!(
        "Class {} ({}) created by user {}",
        class.id, class.nom, session.user_id
    );

    let available_actions = available_actions(&class, session.role);
    Ok(ClassView {
        class,
        available_actions,
    })
}
