use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod ranking;

pub use ranking::{EntryStats, RankingItem, RankingType};

/// Lifecycle state of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "app_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppStatus {
    Development,
    Testing,
    Active,
    Maintenance,
    Deprecated,
    Archived,
}

impl AppStatus {
    pub const ALL: [AppStatus; 6] = [
        AppStatus::Development,
        AppStatus::Testing,
        AppStatus::Active,
        AppStatus::Maintenance,
        AppStatus::Deprecated,
        AppStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppStatus::Development => "development",
            AppStatus::Testing => "testing",
            AppStatus::Active => "active",
            AppStatus::Maintenance => "maintenance",
            AppStatus::Deprecated => "deprecated",
            AppStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for AppStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown app status '{s}'"))
    }
}

/// Row shape of the catalog listing query
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogEntryRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category_id: Option<i64>,
    pub creator_id: Option<i64>,
    pub status: AppStatus,
    pub is_public: bool,
    pub usage_count: i64,
    pub avg_rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
    pub creator_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatorSummary {
    pub id: i64,
    pub name: String,
}

/// Catalog entry as returned by the listing endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub status: AppStatus,
    pub is_public: bool,
    pub usage_count: i64,
    pub avg_rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategorySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<CreatorSummary>,
}

impl From<CatalogEntryRow> for CatalogEntry {
    fn from(row: CatalogEntryRow) -> Self {
        let category = match (row.category_id, row.category_name) {
            (Some(id), Some(name)) => Some(CategorySummary {
                id,
                name,
                color: row.category_color,
            }),
            _ => None,
        };
        let creator = match (row.creator_id, row.creator_name) {
            (Some(id), Some(name)) => Some(CreatorSummary { id, name }),
            _ => None,
        };

        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            status: row.status,
            is_public: row.is_public,
            usage_count: row.usage_count,
            avg_rating: row.avg_rating,
            created_at: row.created_at,
            updated_at: row.updated_at,
            category,
            creator,
        }
    }
}

/// Success envelope shared by every JSON endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, pagination: Pagination) -> Self {
        Self {
            success: true,
            data,
            pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in AppStatus::ALL {
            assert_eq!(status.as_str().parse::<AppStatus>(), Ok(status));
        }
        assert!("published".parse::<AppStatus>().is_err());
    }

    #[test]
    fn pagination_rounds_total_pages_up() {
        assert_eq!(Pagination::new(1, 20, 41).total_pages, 3);
        assert_eq!(Pagination::new(1, 20, 40).total_pages, 2);
        assert_eq!(Pagination::new(1, 20, 0).total_pages, 0);
    }

    #[test]
    fn api_response_omits_missing_fields() {
        let body = serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap();
        assert_eq!(body, serde_json::json!({ "success": true, "data": [1, 2] }));

        let body = serde_json::to_value(ApiResponse::ok(()).with_message("done")).unwrap();
        assert_eq!(body["message"], "done");
    }

    #[test]
    fn entry_without_category_serializes_without_key() {
        let now = Utc::now();
        let entry = CatalogEntry::from(CatalogEntryRow {
            id: 7,
            name: "Summarizer".into(),
            description: "Summarizes documents".into(),
            category_id: None,
            creator_id: Some(2),
            status: AppStatus::Active,
            is_public: true,
            usage_count: 12,
            avg_rating: None,
            created_at: now,
            updated_at: now,
            category_name: None,
            category_color: None,
            creator_name: Some("Ada".into()),
        });

        let body = serde_json::to_value(&entry).unwrap();
        assert!(body.get("category").is_none());
        assert_eq!(body["creator"]["name"], "Ada");
        assert!(body["avg_rating"].is_null());
    }
}
