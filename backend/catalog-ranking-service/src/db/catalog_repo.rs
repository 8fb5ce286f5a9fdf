/// Catalog listing reads
use async_trait::async_trait;
use db_pool::acquire_with_metrics;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{debug, error};

use super::query_builder::ListQuery;
use crate::error::{AppError, Result};
use crate::models::{CatalogEntry, CatalogEntryRow};
use crate::utils::with_deadline;
use crate::SERVICE_NAME;

/// One page of entries plus the total matching the filter
#[derive(Debug, Clone)]
pub struct CatalogPage {
    pub entries: Vec<CatalogEntry>,
    pub total: i64,
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_entries(&self, query: &ListQuery) -> Result<CatalogPage>;
}

pub struct PgCatalogStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    async fn run_list(&self, query: &ListQuery) -> Result<CatalogPage> {
        let mut conn = acquire_with_metrics(&self.pool, SERVICE_NAME)
            .await
            .map_err(|e| {
                error!("Failed to acquire connection for catalog listing: {}", e);
                AppError::from(e)
            })?;

        let mut select = query.select_sql();
        let rows = select
            .build_query_as::<CatalogEntryRow>()
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| {
                error!("Failed to list catalog entries: {}", e);
                AppError::from(e)
            })?;

        let mut count = query.count_sql();
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| {
                error!("Failed to count catalog entries: {}", e);
                AppError::from(e)
            })?;

        debug!(rows = rows.len(), total, "Listed catalog entries");

        Ok(CatalogPage {
            entries: rows.into_iter().map(CatalogEntry::from).collect(),
            total,
        })
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn list_entries(&self, query: &ListQuery) -> Result<CatalogPage> {
        with_deadline(self.query_timeout, "listing catalog entries", self.run_list(query)).await
    }
}
