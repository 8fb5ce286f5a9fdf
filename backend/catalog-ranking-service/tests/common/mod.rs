#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use catalog_ranking_service::db::{CatalogPage, CatalogStore, ListQuery, StatsStore};
use catalog_ranking_service::models::{AppStatus, CatalogEntry, EntryStats};
use catalog_ranking_service::services::UsageWindows;
use catalog_ranking_service::{AppError, RankingService, RankingServiceConfig, Result};

/// Fixed aggregates, as if read from the database
pub struct InMemoryStatsStore {
    stats: Vec<EntryStats>,
}

impl InMemoryStatsStore {
    pub fn new(stats: Vec<EntryStats>) -> Self {
        Self { stats }
    }
}

#[async_trait]
impl StatsStore for InMemoryStatsStore {
    async fn fetch_entry_stats(&self, _windows: &UsageWindows) -> Result<Vec<EntryStats>> {
        Ok(self.stats.clone())
    }
}

pub struct UnavailableStatsStore;

#[async_trait]
impl StatsStore for UnavailableStatsStore {
    async fn fetch_entry_stats(&self, _windows: &UsageWindows) -> Result<Vec<EntryStats>> {
        Err(AppError::Unavailable(
            "connection refused (os error 111) at db.internal:5432".to_string(),
        ))
    }
}

/// Records every listing query and answers with a fixed page
pub struct RecordingCatalogStore {
    pub queries: Mutex<Vec<ListQuery>>,
    entries: Vec<CatalogEntry>,
    total: i64,
    fail: bool,
}

impl RecordingCatalogStore {
    pub fn new(entries: Vec<CatalogEntry>, total: i64) -> Self {
        Self {
            queries: Mutex::new(Vec::new()),
            entries,
            total,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new(), 0)
        }
    }

    pub fn recorded(&self) -> Vec<ListQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogStore for RecordingCatalogStore {
    async fn list_entries(&self, query: &ListQuery) -> Result<CatalogPage> {
        self.queries.lock().unwrap().push(query.clone());
        if self.fail {
            return Err(AppError::Unavailable("pool closed".to_string()));
        }
        Ok(CatalogPage {
            entries: self.entries.clone(),
            total: self.total,
        })
    }
}

pub fn stats(id: i64, avg_rating: Option<f64>, review_count: i64, usage_count: i64) -> EntryStats {
    EntryStats {
        id,
        name: format!("App {id}"),
        description: format!("Description for app {id}"),
        category_name: Some("Productivity".to_string()),
        is_public: true,
        status: AppStatus::Active,
        avg_rating,
        review_count,
        usage_count,
        monthly_usage: 0,
        weekly_usage: 0,
    }
}

/// Two entries: id 1 well reviewed, id 2 heavily used with too few reviews
pub fn scenario_stats() -> Vec<EntryStats> {
    vec![stats(1, Some(4.5), 5, 100), stats(2, Some(4.8), 2, 500)]
}

pub fn ranking_service(store: impl StatsStore + 'static) -> Arc<RankingService> {
    Arc::new(RankingService::new(
        Arc::new(store),
        RankingServiceConfig {
            snapshot_ttl: None,
            ..RankingServiceConfig::default()
        },
    ))
}

/// Build the routed app with the given stores
macro_rules! test_app {
    ($ranking:expr, $catalog:expr) => {{
        let ranking: std::sync::Arc<catalog_ranking_service::RankingService> = $ranking;
        let catalog: std::sync::Arc<dyn catalog_ranking_service::db::CatalogStore> = $catalog;
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::from(ranking))
                .app_data(actix_web::web::Data::from(catalog))
                .configure(catalog_ranking_service::handlers::configure),
        )
        .await
    }};
}
