use actix_web::{error, web, HttpResponse};

use crate::handlers;
use crate::models::ErrorResponse;

/// Registers every route plus the JSON body limits and error shape.
pub fn config(max_json_payload_size: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(json_config(max_json_payload_size))
            .route("/", web::get().to(handlers::index))
            .route("/search", web::post().to(handlers::search))
            .route("/health", web::get().to(handlers::health_check));
    }
}

fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            tracing::warn!("invalid request body: {}", err);
            let response = HttpResponse::BadRequest().json(ErrorResponse::new("Invalid request body"));
            error::InternalError::from_response(err, response).into()
        })
}
