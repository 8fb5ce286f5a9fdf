use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::AppStatus;
use crate::error::AppError;

/// Ranking orderings exposed by the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingType {
    Rating,
    Usage,
    #[default]
    Combined,
    Monthly,
    Weekly,
}

impl RankingType {
    pub const ALL: [RankingType; 5] = [
        RankingType::Rating,
        RankingType::Usage,
        RankingType::Combined,
        RankingType::Monthly,
        RankingType::Weekly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RankingType::Rating => "rating",
            RankingType::Usage => "usage",
            RankingType::Combined => "combined",
            RankingType::Monthly => "monthly",
            RankingType::Weekly => "weekly",
        }
    }
}

impl fmt::Display for RankingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankingType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RankingType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                AppError::InvalidArgument(format!(
                    "Invalid ranking type '{s}'. Must be one of: rating, usage, combined, monthly, weekly"
                ))
            })
    }
}

/// Per-entry aggregates the scoring engine ranks over
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct EntryStats {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category_name: Option<String>,
    pub is_public: bool,
    pub status: AppStatus,
    pub avg_rating: Option<f64>,
    pub review_count: i64,
    pub usage_count: i64,
    pub monthly_usage: i64,
    pub weekly_usage: i64,
}

impl EntryStats {
    /// Public and active entries are the only ones that may be ranked
    pub fn is_listed(&self) -> bool {
        self.is_public && self.status == AppStatus::Active
    }
}

/// One row of a ranking response
///
/// `avg_rating` is always present (null when unrated). The optional fields are
/// populated per ranking type and omitted otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub rank: u32,
    pub avg_rating: Option<f64>,
    pub usage_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_usage: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_usage: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranking_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}
