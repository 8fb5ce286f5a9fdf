use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec,
};

lazy_static! {
    /// Ranking requests by type and where they were served from (snapshot, live).
    pub static ref RANKING_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "ranking_requests_total",
        "Ranking requests segmented by ranking type and source",
        &["type", "source"]
    )
    .expect("failed to register ranking_requests_total");

    /// Time spent fetching aggregates and scoring them.
    pub static ref RANKING_COMPUTE_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "ranking_compute_duration_seconds",
        "Ranking computation duration segmented by ranking type",
        &["type"]
    )
    .expect("failed to register ranking_compute_duration_seconds");

    /// Snapshot refresh attempts (success/error).
    pub static ref RANKING_REFRESH_TOTAL: IntCounterVec = register_int_counter_vec!(
        "ranking_refresh_total",
        "Ranking snapshot refreshes segmented by outcome",
        &["result"]
    )
    .expect("failed to register ranking_refresh_total");

    /// Catalog listing requests (success/error).
    pub static ref CATALOG_LIST_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "catalog_list_requests_total",
        "Catalog listing requests segmented by outcome",
        &["result"]
    )
    .expect("failed to register catalog_list_requests_total");
}

pub fn result_label<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() {
        "success"
    } else {
        "error"
    }
}
