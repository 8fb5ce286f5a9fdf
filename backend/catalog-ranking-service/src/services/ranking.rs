/// Ranking Service
///
/// Serves rankings from the materialized snapshot when it is fresh and
/// recomputes from the aggregate store otherwise.
use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use super::scoring::{clamp_limit, CombinedWeights, RankedEntry, ScoringEngine};
use super::snapshot::RankingSnapshot;
use super::windows::UsageWindows;
use crate::db::StatsStore;
use crate::error::Result;
use crate::metrics::ranking::{
    result_label, RANKING_COMPUTE_DURATION_SECONDS, RANKING_REFRESH_TOTAL,
    RANKING_REQUESTS_TOTAL,
};
use crate::models::{EntryStats, RankingItem, RankingType};
use crate::utils::with_deadline;

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_millis(3000);
pub const DEFAULT_SNAPSHOT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct RankingServiceConfig {
    pub weights: CombinedWeights,
    pub query_timeout: Duration,
    /// `None` serves every request from a live computation
    pub snapshot_ttl: Option<Duration>,
}

impl Default for RankingServiceConfig {
    fn default() -> Self {
        Self {
            weights: CombinedWeights::default(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            snapshot_ttl: Some(DEFAULT_SNAPSHOT_TTL),
        }
    }
}

/// Result of a snapshot refresh
#[derive(Debug, Clone, Serialize)]
pub struct RefreshSummary {
    pub entries: usize,
    pub computed_at: DateTime<Utc>,
}

pub struct RankingService {
    store: Arc<dyn StatsStore>,
    engine: ScoringEngine,
    query_timeout: Duration,
    snapshot_ttl: Option<Duration>,
    snapshot: ArcSwapOption<RankingSnapshot>,
}

impl RankingService {
    pub fn new(store: Arc<dyn StatsStore>, config: RankingServiceConfig) -> Self {
        Self {
            store,
            engine: ScoringEngine::new(config.weights),
            query_timeout: config.query_timeout,
            snapshot_ttl: config.snapshot_ttl,
            snapshot: ArcSwapOption::empty(),
        }
    }

    /// Top entries for `kind`; `limit` is clamped to `[1, 50]`, default 10
    pub async fn get_ranking(
        &self,
        kind: RankingType,
        limit: Option<usize>,
    ) -> Result<Vec<RankingItem>> {
        let limit = clamp_limit(limit);
        let windows = UsageWindows::current();

        if let Some(snapshot) = self.fresh_snapshot(&windows) {
            RANKING_REQUESTS_TOTAL
                .with_label_values(&[kind.as_str(), "snapshot"])
                .inc();
            return Ok(into_items(snapshot.top(kind, limit)));
        }

        let _timer = RANKING_COMPUTE_DURATION_SECONDS
            .with_label_values(&[kind.as_str()])
            .start_timer();
        let stats = self.fetch_stats(&windows).await?;

        let ranked = match self.snapshot_ttl {
            Some(_) => {
                let snapshot = Arc::new(RankingSnapshot::build(&self.engine, windows, &stats));
                self.install_snapshot(Arc::clone(&snapshot));
                snapshot.top(kind, limit)
            }
            None => self.engine.rank(kind, &stats, limit),
        };

        RANKING_REQUESTS_TOTAL
            .with_label_values(&[kind.as_str(), "live"])
            .inc();
        debug!(
            ranking_type = %kind,
            limit,
            returned = ranked.len(),
            "Computed ranking from store"
        );

        Ok(into_items(ranked))
    }

    pub async fn get_ranking_by_rating(&self, limit: Option<usize>) -> Result<Vec<RankingItem>> {
        self.get_ranking(RankingType::Rating, limit).await
    }

    pub async fn get_ranking_by_usage(&self, limit: Option<usize>) -> Result<Vec<RankingItem>> {
        self.get_ranking(RankingType::Usage, limit).await
    }

    pub async fn get_ranking_combined(&self, limit: Option<usize>) -> Result<Vec<RankingItem>> {
        self.get_ranking(RankingType::Combined, limit).await
    }

    pub async fn get_ranking_monthly(&self, limit: Option<usize>) -> Result<Vec<RankingItem>> {
        self.get_ranking(RankingType::Monthly, limit).await
    }

    pub async fn get_ranking_weekly(&self, limit: Option<usize>) -> Result<Vec<RankingItem>> {
        self.get_ranking(RankingType::Weekly, limit).await
    }

    /// Recompute every ranking type and swap in the new snapshot
    ///
    /// A failed refresh leaves the previous snapshot in place.
    pub async fn refresh_rankings(&self) -> Result<RefreshSummary> {
        let windows = UsageWindows::current();
        let result = self
            .fetch_stats(&windows)
            .await
            .map(|stats| RankingSnapshot::build(&self.engine, windows, &stats));
        RANKING_REFRESH_TOTAL
            .with_label_values(&[result_label(&result)])
            .inc();

        let snapshot = result?;
        let summary = RefreshSummary {
            entries: snapshot.entry_count(),
            computed_at: snapshot.computed_at(),
        };
        if !self.install_snapshot(Arc::new(snapshot)) {
            debug!(
                computed_at = %summary.computed_at,
                "Newer ranking snapshot already installed, keeping it"
            );
        }

        info!(
            entries = summary.entries,
            computed_at = %summary.computed_at,
            "Ranking snapshot refreshed"
        );
        Ok(summary)
    }

    /// When the current snapshot was computed, if there is one
    pub fn last_refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot.load_full().map(|s| s.computed_at())
    }

    /// Replace the current snapshot unless it was computed later than `snapshot`
    ///
    /// Returns whether `snapshot` was installed.
    fn install_snapshot(&self, snapshot: Arc<RankingSnapshot>) -> bool {
        let mut installed = false;
        self.snapshot.rcu(|current| match current {
            Some(existing) if existing.computed_at() > snapshot.computed_at() => {
                installed = false;
                Some(Arc::clone(existing))
            }
            _ => {
                installed = true;
                Some(Arc::clone(&snapshot))
            }
        });
        installed
    }

    fn fresh_snapshot(&self, windows: &UsageWindows) -> Option<Arc<RankingSnapshot>> {
        let ttl = self.snapshot_ttl?;
        let snapshot = self.snapshot.load_full()?;
        snapshot.is_fresh(windows, ttl).then_some(snapshot)
    }

    async fn fetch_stats(&self, windows: &UsageWindows) -> Result<Vec<EntryStats>> {
        with_deadline(
            self.query_timeout,
            "fetching entry stats",
            self.store.fetch_entry_stats(windows),
        )
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load ranking aggregates");
            e
        })
    }
}

fn into_items(ranked: Vec<RankedEntry>) -> Vec<RankingItem> {
    ranked.into_iter().map(RankingItem::from).collect()
}
