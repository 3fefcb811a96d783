//! 驳回理由的增删改，成功后使目录缓存失效

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::MotifService;
use crate::errors::Result;
use crate::models::{
    ApiResponse,
    motifs::{entities::RejectionMotif, requests::MotifRequest},
};
use crate::services::{error_response, require_session};

pub async fn create_motif(
    service: &MotifService,
    request: &HttpRequest,
    motif: MotifRequest,
) -> ActixResult<HttpResponse> {
    match save(service, request, None, motif).await {
        Ok(created) => Ok(HttpResponse::Created().json(ApiResponse::success(
            created,
            "Rejection motif created successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn update_motif(
    service: &MotifService,
    request: &HttpRequest,
    motif_id: String,
    motif: MotifRequest,
) -> ActixResult<HttpResponse> {
    match save(service, request, Some(motif_id), motif).await {
        Ok(updated) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            updated,
            "Rejection motif updated successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn delete_motif(
    service: &MotifService,
    request: &HttpRequest,
    motif_id: String,
) -> ActixResult<HttpResponse> {
    match remove(service, request, &motif_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Rejection motif deleted successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn save(
    service: &MotifService,
    request: &HttpRequest,
    motif_id: Option<String>,
    motif: MotifRequest,
) -> Result<RejectionMotif> {
    let session = require_session(request)?;
    motif.validate()?;
    let client = service.get_client(request)?;
    let cache = service.get_cache(request)?;

    let saved = match motif_id {
        Some(id) => {
            let motif = motif.into_motif(Some(id.clone()));
            client.update_motif(&session, &id, &motif).await?
        }
        None => client.create_motif(&session, &motif.into_motif(None)).await?,
    };
    cache.invalidate().await;
    info!(
        "Rejection motif {} saved by user {}",
        saved.code, session.user_id
    );
    Ok(saved)
}

async fn remove(service: &MotifService, request: &HttpRequest, motif_id: &str) -> Result<()> {
    let session = require_session(request)?;
    let client = service.get_client(request)?;
    let cache = service.get_cache(request)?;

    client.delete_motif(&session, motif_id).await?;
    cache.invalidate().await;
    info!("Rejection motif {} deleted by user {}", motif_id, session.user_id);
    Ok(())
}
