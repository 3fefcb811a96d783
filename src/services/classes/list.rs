use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassService;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::{
    ApiResponse,
    classes::{entities::ClassState, requests::ClassQueryParams, responses::ClassListResponse},
};
use crate::presenter::ClassListPresenter;
use crate::services::{error_response, require_session};

pub async fn list_classes(
    service: &ClassService,
    request: &HttpRequest,
    query: ClassQueryParams,
    scope: Option<ClassState>,
) -> ActixResult<HttpResponse> {
    match load_page(service, request, &query, scope).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            page,
            "Class list retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn load_page(
    service: &ClassService,
    request: &HttpRequest,
    query: &ClassQueryParams,
    scope: Option<ClassState>,
) -> Result<ClassListResponse> {
    let session = require_session(request)?;
    let client = service.get_client(request)?;
    let page_size = AppConfig::get().presenter.default_page_size;

    let mut presenter = match scope {
        Some(etat) => ClassListPresenter::scoped(client, session, page_size, etat),
        None => ClassListPresenter::new(client, session, page_size),
    };
    // 参数错误在请求后端之前返回
    presenter.apply_query(query)?;
    presenter.load().await?;
    Ok(presenter.page_view())
}
