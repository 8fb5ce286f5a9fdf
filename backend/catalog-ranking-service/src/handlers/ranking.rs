/// Ranking API Handlers
///
/// HTTP endpoints for catalog rankings
use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::{ApiResponse, RankingType};
use crate::services::scoring::MAX_RANKING_LIMIT;
use crate::services::RankingService;

/// Query parameters for GET /ranking
///
/// Raw strings; validated by `parse_ranking_type` and `parse_limit`.
#[derive(Debug, Default, Deserialize)]
pub struct RankingQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

/// GET /ranking
#[get("/ranking")]
pub async fn get_ranking(
    query: web::Query<RankingQuery>,
    service: web::Data<RankingService>,
) -> Result<HttpResponse> {
    let kind = parse_ranking_type(query.kind.as_deref())?;
    let limit = parse_limit(query.limit.as_deref())?;
    debug!(ranking_type = %kind, ?limit, "Ranking request");

    respond(&service, kind, limit).await
}

#[get("/ranking/rating")]
pub async fn get_ranking_by_rating(
    query: web::Query<LimitQuery>,
    service: web::Data<RankingService>,
) -> Result<HttpResponse> {
    let limit = parse_limit(query.limit.as_deref())?;
    respond(&service, RankingType::Rating, limit).await
}

#[get("/ranking/usage")]
pub async fn get_ranking_by_usage(
    query: web::Query<LimitQuery>,
    service: web::Data<RankingService>,
) -> Result<HttpResponse> {
    let limit = parse_limit(query.limit.as_deref())?;
    respond(&service, RankingType::Usage, limit).await
}

#[get("/ranking/combined")]
pub async fn get_ranking_combined(
    query: web::Query<LimitQuery>,
    service: web::Data<RankingService>,
) -> Result<HttpResponse> {
    let limit = parse_limit(query.limit.as_deref())?;
    respond(&service, RankingType::Combined, limit).await
}

#[get("/ranking/monthly")]
pub async fn get_ranking_monthly(
    query: web::Query<LimitQuery>,
    service: web::Data<RankingService>,
) -> Result<HttpResponse> {
    let limit = parse_limit(query.limit.as_deref())?;
    respond(&service, RankingType::Monthly, limit).await
}

#[get("/ranking/weekly")]
pub async fn get_ranking_weekly(
    query: web::Query<LimitQuery>,
    service: web::Data<RankingService>,
) -> Result<HttpResponse> {
    let limit = parse_limit(query.limit.as_deref())?;
    respond(&service, RankingType::Weekly, limit).await
}

/// POST /ranking/update
///
/// Recomputes all rankings and swaps the materialized snapshot.
#[post("/ranking/update")]
pub async fn update_rankings(service: web::Data<RankingService>) -> Result<HttpResponse> {
    let summary = service.refresh_rankings().await?;

    Ok(HttpResponse::Ok().json(
        ApiResponse::ok(summary).with_message("Rankings updated successfully"),
    ))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_ranking)
        .service(get_ranking_by_rating)
        .service(get_ranking_by_usage)
        .service(get_ranking_combined)
        .service(get_ranking_monthly)
        .service(get_ranking_weekly)
        .service(update_rankings);
}

async fn respond(
    service: &RankingService,
    kind: RankingType,
    limit: Option<usize>,
) -> Result<HttpResponse> {
    let items = service.get_ranking(kind, limit).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(items)))
}

/// Missing or empty `type` means combined
fn parse_ranking_type(raw: Option<&str>) -> Result<RankingType> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(RankingType::default()),
        Some(s) => s.parse(),
    }
}

/// Missing or empty `limit` means the default; anything else must be 1..=50
fn parse_limit(raw: Option<&str>) -> Result<Option<usize>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    match raw.parse::<usize>() {
        Ok(limit) if (1..=MAX_RANKING_LIMIT).contains(&limit) => Ok(Some(limit)),
        _ => Err(AppError::InvalidArgument(format!(
            "limit must be an integer between 1 and {MAX_RANKING_LIMIT}"
        ))),
    }
}
