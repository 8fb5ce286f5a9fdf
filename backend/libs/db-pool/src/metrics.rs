//! Pool occupancy and connection checkout metrics

use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge_vec, HistogramVec,
    IntCounterVec, IntGaugeVec,
};
use sqlx::{pool::PoolConnection, PgPool, Postgres};

lazy_static::lazy_static! {
    static ref POOL_OCCUPANCY: IntGaugeVec = register_int_gauge_vec!(
        "db_pool_connections",
        "Pooled connections per service, split into idle, in_use and max",
        &["service", "state"]
    ).expect("db_pool_connections registers once");

    static ref CHECKOUT_SECONDS: HistogramVec = register_histogram_vec!(
        "db_pool_acquire_duration_seconds",
        "Wait for a pooled connection, per service",
        &["service"],
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]
    ).expect("db_pool_acquire_duration_seconds registers once");

    static ref CHECKOUT_FAILURES: IntCounterVec = register_int_counter_vec!(
        "db_pool_connection_errors_total",
        "Failed connection checkouts, per service and cause",
        &["service", "error_type"]
    ).expect("db_pool_connection_errors_total registers once");
}

/// Point-in-time view of how a pool is occupied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PoolOccupancy {
    pub open: u32,
    pub idle: u32,
    pub max: u32,
}

impl PoolOccupancy {
    pub fn of(pool: &PgPool) -> Self {
        Self {
            open: pool.size(),
            idle: pool.num_idle() as u32,
            max: pool.options().get_max_connections(),
        }
    }

    /// `idle` is sampled after `open`, so the two can briefly disagree
    pub fn in_use(&self) -> u32 {
        self.open.saturating_sub(self.idle)
    }

    pub fn publish(&self, service: &str) {
        for (state, value) in [
            ("idle", self.idle),
            ("in_use", self.in_use()),
            ("max", self.max),
        ] {
            POOL_OCCUPANCY
                .with_label_values(&[service, state])
                .set(i64::from(value));
        }
    }
}

fn checkout_failure_kind(err: &sqlx::Error) -> &'static str {
    match err {
        sqlx::Error::PoolTimedOut => "timeout",
        sqlx::Error::PoolClosed => "closed",
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) => "io",
        _ => "other",
    }
}

/// Check a connection out of `pool`, recording wait time and failures under `service`
///
/// The connection returns to the pool when dropped.
pub async fn acquire_with_metrics(
    pool: &PgPool,
    service: &str,
) -> Result<PoolConnection<Postgres>, sqlx::Error> {
    let timer = CHECKOUT_SECONDS.with_label_values(&[service]).start_timer();
    let result = pool.acquire().await;
    timer.observe_duration();

    if let Err(e) = &result {
        CHECKOUT_FAILURES
            .with_label_values(&[service, checkout_failure_kind(e)])
            .inc();
    }
    result
}
