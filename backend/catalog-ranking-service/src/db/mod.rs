pub mod catalog_repo;
pub mod query_builder;
pub mod stats_repo;

pub use catalog_repo::{CatalogPage, CatalogStore, PgCatalogStore};
pub use query_builder::{CatalogFilter, ListQuery, Page, SortField, SortOrder};
pub use stats_repo::{PgStatsStore, StatsStore};

use sqlx::PgPool;
use tracing::info;

/// Apply pending schema migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
