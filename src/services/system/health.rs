use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use chrono::Utc;
use serde::Serialize;

use super::SystemService;
use crate::models::{AppStartTime, ApiResponse};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub system_name: String,
    pub version: &'static str,
    pub environment: String,
    pub backend_url: String,
    pub uptime_secs: i64,
}

pub async fn health(service: &SystemService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let config = service.get_config();
    let uptime_secs = request
        .app_data::<web::Data<AppStartTime>>()
        .map(|start| (Utc::now() - start.start_datetime).num_seconds())
        .unwrap_or_default();

    let response = HealthResponse {
        status: "ok",
        system_name: config.app.system_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        environment: config.app.environment.clone(),
        backend_url: config.backend.base_url.clone(),
        uptime_secs,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Service is healthy")))
}
