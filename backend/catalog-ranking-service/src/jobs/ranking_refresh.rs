//! Ranking Refresh Background Job
//!
//! Periodically recomputes every ranking type and swaps the materialized
//! snapshot.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;

use crate::services::RankingService;

pub async fn start_ranking_refresher(service: Arc<RankingService>, interval: Duration) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Starting ranking refresh background job"
    );

    loop {
        run_refresh_cycle(&service).await;
        sleep(interval).await;
    }
}

/// One refresh attempt; failures are logged and the previous snapshot stays
pub async fn run_refresh_cycle(service: &RankingService) -> bool {
    let cycle_start = Instant::now();

    match service.refresh_rankings().await {
        Ok(summary) => {
            tracing::info!(
                entries = summary.entries,
                duration_ms = cycle_start.elapsed().as_millis() as u64,
                "Ranking refresh cycle completed"
            );
            true
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                duration_ms = cycle_start.elapsed().as_millis() as u64,
                "Ranking refresh cycle failed"
            );
            false
        }
    }
}
