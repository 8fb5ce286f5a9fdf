/// Catalog listing handler
use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use std::str::FromStr;
use tracing::debug;

use crate::db::query_builder::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::db::{CatalogFilter, CatalogStore, ListQuery, Page, SortField, SortOrder};
use crate::error::{AppError, Result};
use crate::metrics::ranking::{result_label, CATALOG_LIST_REQUESTS_TOTAL};
use crate::models::{AppStatus, PaginatedResponse, Pagination};

/// Query parameters for GET /apps
#[derive(Debug, Default, Deserialize)]
pub struct AppListQuery {
    pub q: Option<String>,
    pub category_id: Option<String>,
    pub status: Option<String>,
    pub is_public: Option<String>,
    pub creator_id: Option<String>,
    /// Comma-separated tag ids
    pub tags: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl AppListQuery {
    pub fn into_list_query(self) -> Result<ListQuery> {
        let filter = CatalogFilter {
            search: non_empty(self.q),
            category_id: parse_opt::<i64>("category_id", self.category_id)?,
            status: non_empty(self.status)
                .map(|s| {
                    AppStatus::from_str(&s).map_err(|_| {
                        AppError::InvalidArgument(format!(
                            "Invalid status. Must be one of: {}",
                            AppStatus::ALL.map(|s| s.as_str()).join(", ")
                        ))
                    })
                })
                .transpose()?,
            is_public: parse_opt::<bool>("is_public", self.is_public)?,
            creator_id: parse_opt::<i64>("creator_id", self.creator_id)?,
            tag_ids: parse_tag_ids(self.tags)?,
        };

        let sort_by = non_empty(self.sort_by)
            .map(|s| s.parse::<SortField>())
            .transpose()?
            .unwrap_or_default();
        let sort_order = non_empty(self.sort_order)
            .map(|s| s.parse::<SortOrder>())
            .transpose()?
            .unwrap_or_default();

        let page = Page::new(
            parse_opt::<i64>("page", self.page)?.unwrap_or(1),
            parse_opt::<i64>("limit", self.limit)?.unwrap_or(DEFAULT_PAGE_SIZE),
            MAX_PAGE_SIZE,
        )?;

        Ok(ListQuery {
            filter,
            sort_by,
            sort_order,
            page,
        })
    }
}

/// GET /apps
#[get("/apps")]
pub async fn list_apps(
    query: web::Query<AppListQuery>,
    store: web::Data<dyn CatalogStore>,
) -> Result<HttpResponse> {
    let list_query = query.into_inner().into_list_query()?;
    debug!(
        sort_by = list_query.sort_by.as_str(),
        page = list_query.page.number(),
        limit = list_query.page.size(),
        "Catalog listing request"
    );

    let result = store.list_entries(&list_query).await;
    CATALOG_LIST_REQUESTS_TOTAL
        .with_label_values(&[result_label(&result)])
        .inc();
    let page = result?;

    let pagination = Pagination::new(list_query.page.number(), list_query.page.size(), page.total);
    Ok(HttpResponse::Ok().json(PaginatedResponse::new(page.entries, pagination)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_apps);
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_opt<T: FromStr>(field: &str, value: Option<String>) -> Result<Option<T>> {
    non_empty(value)
        .map(|v| {
            v.parse::<T>()
                .map_err(|_| AppError::InvalidArgument(format!("Invalid {field}: '{v}'")))
        })
        .transpose()
}

fn parse_tag_ids(value: Option<String>) -> Result<Vec<i64>> {
    let Some(raw) = non_empty(value) else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| AppError::InvalidArgument(format!("Invalid tags: '{s}'")))
        })
        .collect()
}
