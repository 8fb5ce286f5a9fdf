//! Catalog Ranking Service
//!
//! Rankings and filtered listings over a catalog of internal AI applications.
//!
//! # Modules
//!
//! - `db`: parameterized query construction and Postgres-backed stores
//! - `services`: scoring engine, usage windows, ranking snapshot and service
//! - `handlers`: HTTP endpoints mounted under `/api`
//! - `jobs`: periodic snapshot refresh
//! - `metrics`: Prometheus collectors and the `/metrics` handler

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod metrics;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
pub use services::{RankingService, RankingServiceConfig};

/// Service name used for pool metrics and log fields
pub const SERVICE_NAME: &str = "catalog-ranking-service";
