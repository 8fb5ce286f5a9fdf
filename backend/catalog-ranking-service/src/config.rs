/// Configuration management for the catalog ranking service
///
/// Everything is read from environment variables at startup. Invalid values
/// fail startup with a message naming the variable.
use db_pool::env_utils::parse_env_strict;
use db_pool::DbConfig;
use std::time::Duration;

use crate::services::scoring::{CombinedWeights, DEFAULT_RATING_WEIGHT, DEFAULT_USAGE_WEIGHT};
use crate::services::RankingServiceConfig;
use crate::SERVICE_NAME;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub database: DatabaseConfig,
    pub ranking: RankingConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

impl CorsConfig {
    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn allows_any(&self) -> bool {
        self.origins().any(|o| o == "*")
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub pool: DbConfig,
    pub run_migrations: bool,
}

/// Ranking policy and timing
#[derive(Debug, Clone)]
pub struct RankingConfig {
    pub query_timeout_ms: u64,
    pub weights: CombinedWeights,
    /// 0 disables the snapshot
    pub snapshot_ttl_secs: u64,
    /// 0 disables the periodic refresh job
    pub refresh_interval_secs: u64,
}

impl RankingConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }

    pub fn service_config(&self) -> RankingServiceConfig {
        RankingServiceConfig {
            weights: self.weights,
            query_timeout: self.query_timeout(),
            snapshot_ttl: (self.snapshot_ttl_secs > 0)
                .then(|| Duration::from_secs(self.snapshot_ttl_secs)),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        let app = AppConfig {
            env: app_env,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env_strict("APP_PORT", 8080)?,
            workers: parse_env_strict("HTTP_WORKERS", 4)?,
        };
        if app.workers == 0 {
            return Err("HTTP_WORKERS must be at least 1".to_string());
        }

        let cors = {
            let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                Ok(value) => value,
                Err(_) if production => {
                    return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                }
                Err(_) => "http://localhost:3000".to_string(),
            };
            let cors = CorsConfig { allowed_origins };
            if production && cors.allows_any() {
                return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
            }
            cors
        };

        let database = DatabaseConfig {
            pool: DbConfig::from_env(SERVICE_NAME)?,
            run_migrations: parse_env_strict("RUN_MIGRATIONS", false)?,
        };

        let ranking = RankingConfig {
            query_timeout_ms: parse_env_strict("RANKING_QUERY_TIMEOUT_MS", 3_000)?,
            weights: {
                let rating = parse_env_strict("RANKING_RATING_WEIGHT", DEFAULT_RATING_WEIGHT)?;
                let usage = parse_env_strict("RANKING_USAGE_WEIGHT", DEFAULT_USAGE_WEIGHT)?;
                CombinedWeights::new(rating, usage)
                    .map_err(|e| format!("Invalid RANKING_*_WEIGHT: {}", e))?
            },
            snapshot_ttl_secs: parse_env_strict("RANKING_SNAPSHOT_TTL_SECS", 300)?,
            refresh_interval_secs: parse_env_strict("RANKING_REFRESH_INTERVAL_SECS", 600)?,
        };
        if ranking.query_timeout_ms == 0 {
            return Err("RANKING_QUERY_TIMEOUT_MS must be greater than 0".to_string());
        }

        Ok(Config {
            app,
            cors,
            database,
            ranking,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 13] = [
        "APP_ENV",
        "APP_HOST",
        "APP_PORT",
        "HTTP_WORKERS",
        "CORS_ALLOWED_ORIGINS",
        "DATABASE_URL",
        "RUN_MIGRATIONS",
        "RANKING_QUERY_TIMEOUT_MS",
        "RANKING_RATING_WEIGHT",
        "RANKING_USAGE_WEIGHT",
        "RANKING_SNAPSHOT_TTL_SECS",
        "RANKING_REFRESH_INTERVAL_SECS",
        "DB_MAX_CONNECTIONS",
    ];

    fn reset_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
        std::env::set_var("DATABASE_URL", "postgres://localhost/catalog_test");
    }

    #[test]
    #[serial]
    fn defaults() {
        reset_env();
        let config = Config::from_env().unwrap();

        assert_eq!(config.app.port, 8080);
        assert_eq!(config.app.workers, 4);
        assert!(!config.app.is_production());
        assert_eq!(config.cors.origins().collect::<Vec<_>>(), vec!["http://localhost:3000"]);
        assert!(!config.database.run_migrations);
        assert_eq!(config.database.pool.service_name, SERVICE_NAME);
        assert_eq!(config.ranking.query_timeout(), Duration::from_secs(3));
        assert_eq!(config.ranking.weights, CombinedWeights::default());
        assert_eq!(config.ranking.refresh_interval(), Some(Duration::from_secs(600)));
        assert_eq!(
            config.ranking.service_config().snapshot_ttl,
            Some(Duration::from_secs(300))
        );
    }

    #[test]
    #[serial]
    fn zero_disables_snapshot_and_refresh() {
        reset_env();
        std::env::set_var("RANKING_SNAPSHOT_TTL_SECS", "0");
        std::env::set_var("RANKING_REFRESH_INTERVAL_SECS", "0");

        let config = Config::from_env().unwrap();
        assert_eq!(config.ranking.service_config().snapshot_ttl, None);
        assert_eq!(config.ranking.refresh_interval(), None);
        reset_env();
    }

    #[test]
    #[serial]
    fn custom_weights_are_validated() {
        reset_env();
        std::env::set_var("RANKING_RATING_WEIGHT", "0.5");
        std::env::set_var("RANKING_USAGE_WEIGHT", "0.5");
        let config = Config::from_env().unwrap();
        assert_eq!(config.ranking.weights.rating(), 0.5);

        std::env::set_var("RANKING_USAGE_WEIGHT", "0.9");
        let err = Config::from_env().unwrap_err();
        assert!(err.contains("RANKING_*_WEIGHT"));
        reset_env();
    }

    #[test]
    #[serial]
    fn malformed_values_name_the_variable() {
        reset_env();
        std::env::set_var("APP_PORT", "eighty");
        let err = Config::from_env().unwrap_err();
        assert!(err.contains("APP_PORT"));
        reset_env();
    }

    #[test]
    #[serial]
    fn production_requires_explicit_cors() {
        reset_env();
        std::env::set_var("APP_ENV", "production");
        assert!(Config::from_env().unwrap_err().contains("must be set"));

        std::env::set_var("CORS_ALLOWED_ORIGINS", "https://catalog.example.com, *");
        assert!(Config::from_env().unwrap_err().contains("cannot be '*'"));

        std::env::set_var("CORS_ALLOWED_ORIGINS", "https://catalog.example.com");
        assert!(Config::from_env().unwrap().app.is_production());
        reset_env();
    }

    #[test]
    #[serial]
    fn missing_database_url_fails() {
        reset_env();
        std::env::remove_var("DATABASE_URL");
        assert!(Config::from_env().unwrap_err().contains("DATABASE_URL"));
        reset_env();
    }
}
