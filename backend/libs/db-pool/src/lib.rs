//! Database connection pool management
//!
//! Builds the PostgreSQL pool shared by the catalog services. The pool is
//! created once at process start, handed to request handlers as an injected
//! dependency, and closed explicitly on shutdown.

pub mod env_utils;
mod metrics;

pub use metrics::acquire_with_metrics;
use metrics::PoolOccupancy;

use env_utils::parse_env_strict;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info};

/// How often pool gauges are refreshed in the background
const METRICS_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Database connection pool configuration
#[derive(Clone)]
pub struct DbConfig {
    /// Service name for metrics labeling
    pub service_name: String,
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Minimum number of connections
    pub min_connections: u32,
    /// Connection creation timeout (new connection to PostgreSQL)
    pub connect_timeout_secs: u64,
    /// Connection acquisition timeout (get connection from pool)
    pub acquire_timeout_secs: u64,
    /// Connection idle timeout
    pub idle_timeout_secs: u64,
    /// Connection maximum lifetime
    pub max_lifetime_secs: u64,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("service_name", &self.service_name)
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("max_lifetime_secs", &self.max_lifetime_secs)
            .finish()
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            service_name: String::from("unknown"),
            database_url: String::new(),
            max_connections: 20,
            min_connections: 2,
            connect_timeout_secs: 5,
            acquire_timeout_secs: 2,
            idle_timeout_secs: 30,
            max_lifetime_secs: 1800,
        }
    }
}

impl DbConfig {
    /// Create a new DbConfig from environment variables
    ///
    /// Unset `DB_*` variables take their defaults; unparseable ones are an error.
    pub fn from_env(service_name: &str) -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable not set".to_string())?;

        let defaults = Self::default();

        Ok(Self {
            service_name: service_name.to_string(),
            database_url,
            max_connections: parse_env_strict("DB_MAX_CONNECTIONS", defaults.max_connections)?,
            min_connections: parse_env_strict("DB_MIN_CONNECTIONS", defaults.min_connections)?,
            connect_timeout_secs: parse_env_strict("DB_CONNECT_TIMEOUT_SECS", defaults.connect_timeout_secs)?,
            acquire_timeout_secs: parse_env_strict("DB_ACQUIRE_TIMEOUT_SECS", defaults.acquire_timeout_secs)?,
            idle_timeout_secs: parse_env_strict("DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs)?,
            max_lifetime_secs: parse_env_strict("DB_MAX_LIFETIME_SECS", defaults.max_lifetime_secs)?,
        })
    }

    /// Log pool configuration details
    pub fn log_config(&self) {
        info!(
            service = %self.service_name,
            max_connections = self.max_connections,
            min_connections = self.min_connections,
            connect_timeout_secs = self.connect_timeout_secs,
            acquire_timeout_secs = self.acquire_timeout_secs,
            idle_timeout_secs = self.idle_timeout_secs,
            max_lifetime_secs = self.max_lifetime_secs,
            "Database pool configuration"
        );
    }
}

/// Create a PostgreSQL connection pool with automatic metrics monitoring
pub async fn create_pool(config: DbConfig) -> Result<PgPool, sqlx::Error> {
    debug!(
        service = %config.service_name,
        max = config.max_connections,
        min = config.min_connections,
        acquire_timeout_secs = config.acquire_timeout_secs,
        "Creating database pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .test_before_acquire(true)
        .connect(&config.database_url)
        .await?;

    match tokio::time::timeout(
        Duration::from_secs(config.connect_timeout_secs),
        sqlx::query("SELECT 1").execute(&pool),
    )
    .await
    {
        Ok(Ok(_)) => {
            info!(
                service = %config.service_name,
                "Database pool created and verified successfully"
            );

            PoolOccupancy::of(&pool).publish(&config.service_name);

            let pool_clone = pool.clone();
            let service = config.service_name.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(METRICS_REFRESH_INTERVAL);
                while !pool_clone.is_closed() {
                    interval.tick().await;
                    PoolOccupancy::of(&pool_clone).publish(&service);
                }
            });

            Ok(pool)
        }
        Ok(Err(e)) => {
            error!(
                service = %config.service_name,
                error = %e,
                "Database connection verification failed"
            );
            Err(e)
        }
        Err(_) => {
            error!(
                service = %config.service_name,
                timeout_secs = config.connect_timeout_secs,
                "Database connection verification timeout"
            );
            Err(sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "Database verification timeout",
            )))
        }
    }
}

/// Close the pool, waiting for checked-out connections to be returned
pub async fn close_pool(pool: &PgPool, service_name: &str) {
    pool.close().await;
    info!(service = %service_name, "Database pool closed");
}
