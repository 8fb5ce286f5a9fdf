/// Aggregate reads feeding the scoring engine
use async_trait::async_trait;
use db_pool::acquire_with_metrics;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, error};

use super::query_builder::CatalogFilter;
use crate::error::{AppError, Result};
use crate::models::EntryStats;
use crate::services::windows::UsageWindows;
use crate::SERVICE_NAME;

const ENTRY_STATS_SELECT: &str = r#"
    SELECT a.id, a.name, a.description, c.name AS category_name, a.is_public, a.status,
           r.avg_rating, COALESCE(r.review_count, 0) AS review_count, a.usage_count,
           COALESCE(w.monthly_usage, 0) AS monthly_usage,
           COALESCE(w.weekly_usage, 0) AS weekly_usage
    FROM ai_apps a
    LEFT JOIN categories c ON c.id = a.category_id
    LEFT JOIN (
        SELECT app_id, AVG(rating)::FLOAT8 AS avg_rating, COUNT(*) AS review_count
        FROM reviews
        GROUP BY app_id
    ) r ON r.app_id = a.id
    LEFT JOIN (
        SELECT app_id,
"#;

/// Source of per-entry aggregates
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Stats for every public, active entry, with usage counted inside `windows`
    async fn fetch_entry_stats(&self, windows: &UsageWindows) -> Result<Vec<EntryStats>>;
}

/// Postgres-backed [`StatsStore`]
pub struct PgStatsStore {
    pool: PgPool,
}

impl PgStatsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsStore for PgStatsStore {
    async fn fetch_entry_stats(&self, windows: &UsageWindows) -> Result<Vec<EntryStats>> {
        let mut conn = acquire_with_metrics(&self.pool, SERVICE_NAME)
            .await
            .map_err(|e| {
                error!("Failed to acquire connection for entry stats: {}", e);
                AppError::from(e)
            })?;

        let mut query = entry_stats_sql(windows);
        let stats = query
            .build_query_as::<EntryStats>()
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| {
                error!("Failed to fetch entry stats: {}", e);
                AppError::from(e)
            })?;

        debug!(entries = stats.len(), "Fetched entry stats");
        Ok(stats)
    }
}

/// Aggregate query over the ranking population
///
/// Usage events are counted from the earlier window start up to `windows.now`.
pub(crate) fn entry_stats_sql(windows: &UsageWindows) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(ENTRY_STATS_SELECT.trim_end());
    qb.push(" COUNT(*) FILTER (WHERE created_at >= ")
        .push_bind(windows.month_start)
        .push(") AS monthly_usage,");
    qb.push(" COUNT(*) FILTER (WHERE created_at >= ")
        .push_bind(windows.week_start)
        .push(") AS weekly_usage");
    qb.push(" FROM usage_logs WHERE created_at >= ")
        .push_bind(windows.month_start.min(windows.week_start))
        .push(" AND created_at <= ")
        .push_bind(windows.now);
    qb.push(" GROUP BY app_id) w ON w.app_id = a.id");

    CatalogFilter::ranking_population().push_where(&mut qb);
    qb
}
