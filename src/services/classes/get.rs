use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassService;
use crate::lifecycle::available_actions;
use crate::models::{ApiResponse, classes::responses::ClassView};
use crate::services::{error_response, require_session};

pub async fn get_class(
    service: &ClassService,
    request: &HttpRequest,
    class_id: String,
) -> ActixResult<HttpResponse> {
    let session = match require_session(request) {
        Ok(session) => session,
        Err(e) => return Ok(error_response(&e)),
    };
    let client = match service.get_client(request) {
        Ok(client) => client,
        Err(e) => return Ok(error_response(&e)),
    };

    match client.get_class(&session, &class_id).await {
        Ok(class) => {
            let available_actions = available_actions(&class, session.role);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                ClassView {
                    class,
                    available_actions,
                },
                "Class information retrieved successfully",
            )))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn activation_history(
    service: &ClassService,
    request: &HttpRequest,
    class_id: String,
) -> ActixResult<HttpResponse> {
    let session = match require_session(request) {
        Ok(session) => session,
        Err(e) => return Ok(error_response(&e)),
    };
    let client = match service.get_client(request) {
        Ok(client) => client,
        Err(e) => return Ok(error_response(&e)),
    };

    match client.activation_history(&session, &class_id).await {
        Ok(history) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            history,
            "Activation history retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
