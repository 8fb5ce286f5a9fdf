use std::cmp::Ordering;

use crate::error::{AppError, Result};
use crate::models::{EntryStats, RankingItem, RankingType};

/// Entries with fewer reviews than this have no qualifying rating
pub const MIN_REVIEWS_FOR_RATING: i64 = 3;
pub const MAX_RATING: f64 = 5.0;

pub const DEFAULT_RATING_WEIGHT: f64 = 0.4;
pub const DEFAULT_USAGE_WEIGHT: f64 = 0.6;

pub const DEFAULT_RANKING_LIMIT: usize = 10;
pub const MAX_RANKING_LIMIT: usize = 50;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Clamp a requested ranking size into `[1, MAX_RANKING_LIMIT]`
pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit
        .unwrap_or(DEFAULT_RANKING_LIMIT)
        .clamp(1, MAX_RANKING_LIMIT)
}

/// Blend weights for the combined ranking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombinedWeights {
    rating: f64,
    usage: f64,
}

impl CombinedWeights {
    pub fn new(rating: f64, usage: f64) -> Result<Self> {
        let in_range = |w: f64| w.is_finite() && (0.0..=1.0).contains(&w);
        if !in_range(rating) || !in_range(usage) {
            return Err(AppError::InvalidArgument(format!(
                "combined weights must lie in [0, 1], got rating={rating} usage={usage}"
            )));
        }
        if ((rating + usage) - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(AppError::InvalidArgument(format!(
                "combined weights must sum to 1, got {}",
                rating + usage
            )));
        }

        Ok(Self { rating, usage })
    }

    pub fn rating(&self) -> f64 {
        self.rating
    }

    pub fn usage(&self) -> f64 {
        self.usage
    }
}

impl Default for CombinedWeights {
    fn default() -> Self {
        Self {
            rating: DEFAULT_RATING_WEIGHT,
            usage: DEFAULT_USAGE_WEIGHT,
        }
    }
}

/// An entry placed in a ranking, with the metric it was ordered by
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub rank: u32,
    pub kind: RankingType,
    pub score: f64,
    pub stats: EntryStats,
}

impl From<RankedEntry> for RankingItem {
    fn from(entry: RankedEntry) -> Self {
        let RankedEntry {
            rank,
            kind,
            score,
            stats,
        } = entry;

        let (ranking_score, review_count, monthly_usage, weekly_usage) = match kind {
            RankingType::Rating => (Some(score), Some(stats.review_count), None, None),
            RankingType::Usage => (None, None, None, None),
            RankingType::Combined => (Some(score), Some(stats.review_count), None, None),
            RankingType::Monthly => (None, None, Some(stats.monthly_usage), None),
            RankingType::Weekly => (None, None, None, Some(stats.weekly_usage)),
        };

        Self {
            id: stats.id,
            name: stats.name,
            description: stats.description,
            rank,
            avg_rating: stats.avg_rating,
            usage_count: stats.usage_count,
            monthly_usage,
            weekly_usage,
            ranking_score,
            review_count,
            category: stats.category_name,
        }
    }
}

/// Pure ranking over per-entry aggregates
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine {
    weights: CombinedWeights,
}

impl ScoringEngine {
    pub fn new(weights: CombinedWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> CombinedWeights {
        self.weights
    }

    /// Rank `stats` by `kind` and keep the top `limit`
    ///
    /// Filters to the eligible set, orders by metric descending with a
    /// deterministic tie-break, numbers ranks from 1 and truncates.
    pub fn rank(&self, kind: RankingType, stats: &[EntryStats], limit: usize) -> Vec<RankedEntry> {
        let eligible: Vec<&EntryStats> = stats.iter().filter(|s| is_eligible(kind, s)).collect();
        let max_usage = eligible.iter().map(|s| s.usage_count).max().unwrap_or(0);

        let mut scored: Vec<(f64, &EntryStats)> = eligible
            .into_iter()
            .map(|s| (self.metric(kind, s, max_usage), s))
            .collect();

        scored.sort_by(|(score_a, a), (score_b, b)| {
            score_b
                .total_cmp(score_a)
                .then_with(|| tie_break(kind, a, b))
        });

        scored
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(idx, (score, s))| RankedEntry {
                rank: idx as u32 + 1,
                kind,
                score,
                stats: s.clone(),
            })
            .collect()
    }

    /// Weighted blend of normalized rating and normalized usage, in `[0, 1]`
    pub fn combined_score(&self, stats: &EntryStats, max_usage: i64) -> f64 {
        let score =
            self.weights.rating * rating_norm(stats) + self.weights.usage * usage_norm(stats, max_usage);
        score.clamp(0.0, 1.0)
    }

    fn metric(&self, kind: RankingType, stats: &EntryStats, max_usage: i64) -> f64 {
        match kind {
            RankingType::Rating => stats.avg_rating.unwrap_or(0.0),
            RankingType::Usage => stats.usage_count as f64,
            RankingType::Combined => self.combined_score(stats, max_usage),
            RankingType::Monthly => stats.monthly_usage as f64,
            RankingType::Weekly => stats.weekly_usage as f64,
        }
    }
}

fn is_eligible(kind: RankingType, stats: &EntryStats) -> bool {
    if !stats.is_listed() {
        return false;
    }
    match kind {
        RankingType::Rating => has_qualifying_rating(stats),
        _ => true,
    }
}

fn has_qualifying_rating(stats: &EntryStats) -> bool {
    stats.review_count >= MIN_REVIEWS_FOR_RATING && stats.avg_rating.is_some()
}

fn rating_norm(stats: &EntryStats) -> f64 {
    match stats.avg_rating {
        Some(avg) if has_qualifying_rating(stats) => (avg / MAX_RATING).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

fn usage_norm(stats: &EntryStats, max_usage: i64) -> f64 {
    if max_usage <= 0 {
        return 0.0;
    }
    (stats.usage_count as f64 / max_usage as f64).clamp(0.0, 1.0)
}

fn tie_break(kind: RankingType, a: &EntryStats, b: &EntryStats) -> Ordering {
    match kind {
        RankingType::Rating => b
            .usage_count
            .cmp(&a.usage_count)
            .then_with(|| a.id.cmp(&b.id)),
        _ => a.id.cmp(&b.id),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::AppStatus;

    pub(crate) fn entry(id: i64, avg: Option<f64>, reviews: i64, usage: i64) -> EntryStats {
        EntryStats {
            id,
            name: format!("app-{id}"),
            description: format!("description {id}"),
            category_name: None,
            is_public: true,
            status: AppStatus::Active,
            avg_rating: avg,
            review_count: reviews,
            usage_count: usage,
            monthly_usage: 0,
            weekly_usage: 0,
        }
    }

    fn ids(ranked: &[RankedEntry]) -> Vec<i64> {
        ranked.iter().map(|r| r.stats.id).collect()
    }

    fn scenario_set() -> Vec<EntryStats> {
        vec![entry(1, Some(4.5), 5, 100), entry(2, Some(4.8), 2, 500)]
    }

    #[test]
    fn rating_excludes_entries_below_review_threshold() {
        let ranked = ScoringEngine::default().rank(RankingType::Rating, &scenario_set(), 10);
        assert_eq!(ids(&ranked), vec![1]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].score, 4.5);
    }

    #[test]
    fn usage_orders_by_usage_count() {
        let ranked = ScoringEngine::default().rank(RankingType::Usage, &scenario_set(), 10);
        assert_eq!(ids(&ranked), vec![2, 1]);
        assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn combined_uses_default_weights() {
        let ranked = ScoringEngine::default().rank(RankingType::Combined, &scenario_set(), 10);
        // id 1: 0.4 * 0.9 + 0.6 * 0.2 = 0.48; id 2: 0.4 * 0 + 0.6 * 1.0 = 0.6
        assert_eq!(ids(&ranked), vec![2, 1]);
        assert!((ranked[0].score - 0.6).abs() < 1e-9);
        assert!((ranked[1].score - 0.48).abs() < 1e-9);
    }

    #[test]
    fn combined_respects_custom_weights() {
        let engine = ScoringEngine::new(CombinedWeights::new(1.0, 0.0).unwrap());
        let ranked = engine.rank(RankingType::Combined, &scenario_set(), 10);
        assert_eq!(ids(&ranked), vec![1, 2]);
    }

    #[test]
    fn combined_score_stays_within_unit_interval() {
        let engine = ScoringEngine::default();
        let set = vec![
            entry(1, Some(5.0), 100, 10_000),
            entry(2, Some(0.0), 3, 0),
            entry(3, None, 0, 0),
            entry(4, Some(2.5), 10, 5_000),
        ];
        for stats in &set {
            let score = engine.combined_score(stats, 10_000);
            assert!((0.0..=1.0).contains(&score), "score {score} out of range");
        }
        assert!((engine.combined_score(&set[0], 10_000) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn usage_norm_is_zero_when_max_usage_is_zero() {
        let set = vec![entry(1, None, 0, 0), entry(2, None, 0, 0)];
        let ranked = ScoringEngine::default().rank(RankingType::Combined, &set, 10);
        assert!(ranked.iter().all(|r| r.score == 0.0));
        assert_eq!(ids(&ranked), vec![1, 2]);
    }

    #[test]
    fn ranks_are_dense_with_ties() {
        let set = vec![
            entry(5, None, 0, 10),
            entry(3, None, 0, 10),
            entry(9, None, 0, 10),
            entry(1, None, 0, 7),
        ];
        let ranked = ScoringEngine::default().rank(RankingType::Usage, &set, 10);
        assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(ids(&ranked), vec![3, 5, 9, 1]);
    }

    #[test]
    fn rating_ties_break_on_usage_then_id() {
        let set = vec![
            entry(4, Some(4.0), 3, 10),
            entry(2, Some(4.0), 3, 50),
            entry(1, Some(4.0), 3, 10),
        ];
        let ranked = ScoringEngine::default().rank(RankingType::Rating, &set, 10);
        assert_eq!(ids(&ranked), vec![2, 1, 4]);
    }

    #[test]
    fn ranking_is_deterministic_regardless_of_input_order() {
        let mut set = vec![
            entry(1, Some(3.0), 4, 20),
            entry(2, Some(4.0), 4, 20),
            entry(3, Some(3.0), 4, 20),
            entry(4, None, 0, 80),
        ];
        let engine = ScoringEngine::default();
        let first = engine.rank(RankingType::Combined, &set, 10);
        set.reverse();
        let second = engine.rank(RankingType::Combined, &set, 10);
        assert_eq!(first, second);
    }

    #[test]
    fn usage_monotonicity() {
        let set = vec![entry(1, None, 0, 10), entry(2, None, 0, 30), entry(3, None, 0, 20)];
        let ranked = ScoringEngine::default().rank(RankingType::Usage, &set, 10);
        for pair in ranked.windows(2) {
            assert!(pair[0].stats.usage_count >= pair[1].stats.usage_count);
        }
    }

    #[test]
    fn private_and_inactive_entries_are_never_ranked() {
        let mut private = entry(1, Some(5.0), 10, 1_000);
        private.is_public = false;
        let mut archived = entry(2, Some(5.0), 10, 1_000);
        archived.status = AppStatus::Archived;
        let visible = entry(3, Some(1.0), 3, 1);

        let set = vec![private, archived, visible];
        for kind in RankingType::ALL {
            let ranked = ScoringEngine::default().rank(kind, &set, 10);
            assert_eq!(ids(&ranked), vec![3], "type {kind}");
        }
    }

    #[test]
    fn ineligible_entries_do_not_affect_usage_normalization() {
        let mut hidden = entry(1, None, 0, 1_000);
        hidden.is_public = false;
        let set = vec![hidden, entry(2, None, 0, 50)];
        let ranked = ScoringEngine::default().rank(RankingType::Combined, &set, 10);
        assert!((ranked[0].score - 0.6).abs() < 1e-9);
    }

    #[test]
    fn monthly_and_weekly_use_window_counts() {
        let mut a = entry(1, None, 0, 500);
        a.monthly_usage = 3;
        a.weekly_usage = 9;
        let mut b = entry(2, None, 0, 10);
        b.monthly_usage = 8;
        b.weekly_usage = 1;
        let set = vec![a, b];

        let engine = ScoringEngine::default();
        assert_eq!(ids(&engine.rank(RankingType::Monthly, &set, 10)), vec![2, 1]);
        assert_eq!(ids(&engine.rank(RankingType::Weekly, &set, 10)), vec![1, 2]);
    }

    #[test]
    fn truncates_to_limit() {
        let set: Vec<_> = (1..=20).map(|id| entry(id, None, 0, id * 3)).collect();
        let ranked = ScoringEngine::default().rank(RankingType::Usage, &set, 5);
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].stats.id, 20);
        assert_eq!(ranked[4].rank, 5);
    }

    #[test]
    fn empty_input_yields_empty_ranking() {
        for kind in RankingType::ALL {
            assert!(ScoringEngine::default().rank(kind, &[], 10).is_empty());
        }
    }

    #[test]
    fn clamp_limit_bounds() {
        assert_eq!(clamp_limit(None), 10);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(1000)), 50);
        assert_eq!(clamp_limit(Some(25)), 25);
    }

    #[test]
    fn weights_must_be_in_range_and_sum_to_one() {
        assert!(CombinedWeights::new(0.5, 0.5).is_ok());
        assert!(CombinedWeights::new(0.7, 0.4).is_err());
        assert!(CombinedWeights::new(-0.2, 1.2).is_err());
        assert!(CombinedWeights::new(f64::NAN, 0.5).is_err());
        assert_eq!(CombinedWeights::default().rating(), 0.4);
        assert_eq!(CombinedWeights::default().usage(), 0.6);
    }

    #[test]
    fn item_fields_follow_ranking_type() {
        let mut stats = entry(1, Some(4.5), 5, 100);
        stats.monthly_usage = 7;
        stats.weekly_usage = 2;

        let item = |kind| {
            RankingItem::from(RankedEntry {
                rank: 1,
                kind,
                score: 0.5,
                stats: stats.clone(),
            })
        };

        let rating = item(RankingType::Rating);
        assert_eq!(rating.ranking_score, Some(0.5));
        assert_eq!(rating.review_count, Some(5));

        let usage = item(RankingType::Usage);
        assert_eq!(usage.ranking_score, None);
        assert_eq!(usage.review_count, None);

        let combined = item(RankingType::Combined);
        assert_eq!(combined.ranking_score, Some(0.5));

        assert_eq!(item(RankingType::Monthly).monthly_usage, Some(7));
        assert_eq!(item(RankingType::Weekly).weekly_usage, Some(2));
        assert_eq!(item(RankingType::Weekly).monthly_usage, None);
    }
}
