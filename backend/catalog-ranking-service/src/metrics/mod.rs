//! Ranking and catalog collectors, exported at `/metrics`

use actix_web::HttpResponse;
use prometheus::{Encoder, TextEncoder};

use crate::error::{AppError, Result};

pub mod ranking;

/// Every registered collector in the Prometheus text format
pub fn render() -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| AppError::Internal(format!("metrics encoding failed: {e}")))?;
    Ok(buffer)
}

/// GET /metrics
pub async fn serve_metrics() -> Result<HttpResponse> {
    let body = render()?;
    Ok(HttpResponse::Ok()
        .content_type(TextEncoder::new().format_type())
        .body(body))
}
