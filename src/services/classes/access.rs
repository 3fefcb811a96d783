use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassService;
use crate::errors::Result;
use crate::modals::ClassActionModal;
use crate::models::{ApiResponse, classes::requests::AccessRequest};
use crate::services::{error_response, require_session};

pub async fn redeem_access(
    service: &ClassService,
    request: &HttpRequest,
    access: AccessRequest,
) -> ActixResult<HttpResponse> {
    match redeem(service, request, access).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Access request submitted",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn redeem(service: &ClassService, request: &HttpRequest, access: AccessRequest) -> Result<()> {
    let session = require_session(request)?;
    let client = service.get_client(request)?;
    let inflight = service.get_inflight(request)?;

    let mut modal = ClassActionModal::access_request(access.token, &session)?;
    modal
        .submit_with(&*client, &session, &inflight)
        .await
}
