pub mod ranking;
pub mod scoring;
pub mod snapshot;
pub mod windows;

pub use ranking::{RankingService, RankingServiceConfig, RefreshSummary};
pub use scoring::{CombinedWeights, RankedEntry, ScoringEngine};
pub use snapshot::RankingSnapshot;
pub use windows::UsageWindows;
