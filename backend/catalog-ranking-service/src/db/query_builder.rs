//! Parameterized SQL for catalog filters, sorting and pagination
//!
//! Every user-supplied value is pushed as a bind parameter. Only allow-listed
//! identifiers from [`SortField`] and [`SortOrder`] are written into the SQL text.

use sqlx::{Postgres, QueryBuilder};
use std::str::FromStr;

use crate::error::AppError;
use crate::models::AppStatus;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

const LISTING_SELECT: &str = r#"
    SELECT a.id, a.name, a.description, a.category_id, a.creator_id, a.status,
           a.is_public, a.usage_count, a.avg_rating, a.created_at, a.updated_at,
           c.name AS category_name, c.color AS category_color, u.name AS creator_name
    FROM ai_apps a
    LEFT JOIN categories c ON c.id = a.category_id
    LEFT JOIN users u ON u.id = a.creator_id
"#;

const LISTING_COUNT: &str = "SELECT COUNT(*) FROM ai_apps a";

/// Columns a listing may be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Name,
    #[default]
    CreatedAt,
    UpdatedAt,
    UsageCount,
    AvgRating,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::UsageCount => "usage_count",
            SortField::AvgRating => "avg_rating",
        }
    }

    fn column(&self) -> &'static str {
        match self {
            SortField::Name => "a.name",
            SortField::CreatedAt => "a.created_at",
            SortField::UpdatedAt => "a.updated_at",
            SortField::UsageCount => "a.usage_count",
            SortField::AvgRating => "a.avg_rating",
        }
    }
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortField::Name),
            "created_at" => Ok(SortField::CreatedAt),
            "updated_at" => Ok(SortField::UpdatedAt),
            "usage_count" => Ok(SortField::UsageCount),
            "avg_rating" => Ok(SortField::AvgRating),
            _ => Err(AppError::InvalidArgument(
                "Invalid sort_by. Must be one of: name, created_at, updated_at, usage_count, avg_rating"
                    .to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(AppError::InvalidArgument(
                "Invalid sort_order. Must be one of: asc, desc".to_string(),
            )),
        }
    }
}

/// 1-based page with a bounded size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: i64,
    size: i64,
}

impl Page {
    pub fn new(number: i64, size: i64, max_size: i64) -> Result<Self, AppError> {
        if number < 1 {
            return Err(AppError::InvalidArgument(
                "page must be a positive integer".to_string(),
            ));
        }
        if !(1..=max_size).contains(&size) {
            return Err(AppError::InvalidArgument(format!(
                "limit must be between 1 and {max_size}"
            )));
        }
        Ok(Self { number, size })
    }

    pub fn number(&self) -> i64 {
        self.number
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1).saturating_mul(self.size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Optional predicates over catalog entries, combined with AND
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogFilter {
    /// Case-insensitive substring of name or description
    pub search: Option<String>,
    pub category_id: Option<i64>,
    pub status: Option<AppStatus>,
    pub is_public: Option<bool>,
    pub creator_id: Option<i64>,
    /// Matches entries carrying any of these tags
    pub tag_ids: Vec<i64>,
}

impl CatalogFilter {
    /// The population every ranking is drawn from
    pub fn ranking_population() -> Self {
        Self {
            is_public: Some(true),
            status: Some(AppStatus::Active),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Append ` WHERE ...` for the set predicates; appends nothing when empty
    pub fn push_where(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        let mut clauses = ClauseWriter::new(qb);

        if let Some(term) = self.search.as_deref().filter(|t| !t.trim().is_empty()) {
            let pattern = format!("%{}%", escape_like(term.trim()));
            let qb = clauses.next();
            qb.push("(a.name ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR a.description ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }
        if let Some(category_id) = self.category_id {
            clauses.next().push("a.category_id = ").push_bind(category_id);
        }
        if let Some(status) = self.status {
            clauses.next().push("a.status = ").push_bind(status);
        }
        if let Some(is_public) = self.is_public {
            clauses.next().push("a.is_public = ").push_bind(is_public);
        }
        if let Some(creator_id) = self.creator_id {
            clauses.next().push("a.creator_id = ").push_bind(creator_id);
        }
        if !self.tag_ids.is_empty() {
            clauses
                .next()
                .push("EXISTS (SELECT 1 FROM app_tags at WHERE at.app_id = a.id AND at.tag_id = ANY(")
                .push_bind(self.tag_ids.clone())
                .push("))");
        }
    }
}

/// Writes ` WHERE ` before the first clause and ` AND ` before the rest
struct ClauseWriter<'q> {
    qb: &'q mut QueryBuilder<'static, Postgres>,
    written: usize,
}

impl<'q> ClauseWriter<'q> {
    fn new(qb: &'q mut QueryBuilder<'static, Postgres>) -> Self {
        Self { qb, written: 0 }
    }

    fn next(&mut self) -> &mut QueryBuilder<'static, Postgres> {
        self.qb.push(if self.written == 0 { " WHERE " } else { " AND " });
        self.written += 1;
        &mut *self.qb
    }
}

/// Escape LIKE wildcards so the term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// A complete listing request: filter, ordering and page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filter: CatalogFilter,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub page: Page,
}

impl ListQuery {
    /// Page of rows, ordered by the sort column then id
    pub fn select_sql(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(LISTING_SELECT.trim_end());
        self.filter.push_where(&mut qb);
        qb.push(" ORDER BY ")
            .push(self.sort_by.column())
            .push(" ")
            .push(self.sort_order.keyword())
            .push(" NULLS LAST, a.id ASC");
        qb.push(" LIMIT ").push_bind(self.page.size());
        qb.push(" OFFSET ").push_bind(self.page.offset());
        qb
    }

    /// Total rows matching the same predicate
    pub fn count_sql(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(LISTING_COUNT);
        self.filter.push_where(&mut qb);
        qb
    }
}
