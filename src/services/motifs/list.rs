use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::MotifService;
use crate::errors::Result;
use crate::models::{ApiResponse, motifs::entities::RejectionMotif};
use crate::services::{error_response, require_session};

pub async fn list_motifs(service: &MotifService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    match load_catalog(service, request).await {
        Ok(motifs) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            motifs.as_slice(),
            "Rejection motifs retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn load_catalog(
    service: &MotifService,
    request: &HttpRequest,
) -> Result<Arc<Vec<RejectionMotif>>> {
    let session = require_session(request)?;
    let client = service.get_client(request)?;
    let cache = service.get_cache(request)?;
    cache.get_or_fetch(&*client, &session).await
}
