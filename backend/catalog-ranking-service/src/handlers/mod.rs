use actix_web::error::QueryPayloadError;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::debug;

use crate::error::AppError;

pub mod apps;
pub mod ranking;

/// Routes mounted under `/api`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::QueryConfig::default().error_handler(query_error))
            .route("/health", web::get().to(health))
            .configure(ranking::configure)
            .configure(apps::configure),
    );
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": crate::SERVICE_NAME,
    }))
}

/// Malformed query strings answer with the standard error body
fn query_error(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!(path = %req.path(), error = %err, "Rejected malformed query string");
    AppError::InvalidArgument("Malformed query string".to_string()).into()
}
