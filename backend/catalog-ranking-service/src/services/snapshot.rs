use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

use super::scoring::{RankedEntry, ScoringEngine, MAX_RANKING_LIMIT};
use super::windows::UsageWindows;
use crate::models::{EntryStats, RankingType};

/// Every ranking type computed from one consistent read of the aggregates
#[derive(Debug, Clone)]
pub struct RankingSnapshot {
    windows: UsageWindows,
    entry_count: usize,
    rankings: HashMap<RankingType, Vec<RankedEntry>>,
}

impl RankingSnapshot {
    /// Materialize the top `MAX_RANKING_LIMIT` of each type
    pub fn build(engine: &ScoringEngine, windows: UsageWindows, stats: &[EntryStats]) -> Self {
        let rankings = RankingType::ALL
            .into_iter()
            .map(|kind| (kind, engine.rank(kind, stats, MAX_RANKING_LIMIT)))
            .collect();

        Self {
            windows,
            entry_count: stats.len(),
            rankings,
        }
    }

    pub fn computed_at(&self) -> DateTime<Utc> {
        self.windows.now
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Top `limit` entries of `kind`
    pub fn top(&self, kind: RankingType, limit: usize) -> Vec<RankedEntry> {
        self.rankings
            .get(&kind)
            .map(|ranked| ranked.iter().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    /// Younger than `ttl` and still inside the calendar windows it was built for
    pub fn is_fresh(&self, now: &UsageWindows, ttl: Duration) -> bool {
        let age = now.now.signed_duration_since(self.windows.now);
        let Ok(age) = age.to_std() else {
            // clock moved backwards
            return false;
        };
        age < ttl && self.windows.same_period(now)
    }
}
