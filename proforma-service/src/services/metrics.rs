//! Prometheus metrics for proforma-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_histogram_vec, Counter, CounterVec,
    HistogramVec, TextEncoder,
};

/// HTTP requests by method, matched route and status.
pub static HTTP_REQUESTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "proforma_http_requests_total",
        "Total HTTP requests by method, route and status",
        &["method", "path", "status"]
    )
    .expect("Failed to register http_requests_total")
});

/// Store query duration histogram by operation.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "proforma_db_query_duration_seconds",
        "Store query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register db_query_duration")
});

/// Saved proformas by mode (create, update).
pub static PROFORMAS_SAVED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "proforma_saves_total",
        "Total number of proforma saves by mode",
        &["mode"]
    )
    .expect("Failed to register proformas_saved_total")
});

/// Rendered printable documents.
pub static DOCUMENTS_RENDERED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "proforma_documents_rendered_total",
        "Total number of rendered proforma documents"
    )
    .expect("Failed to register documents_rendered_total")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&HTTP_REQUESTS_TOTAL);
    Lazy::force(&DB_QUERY_DURATION);
    Lazy::force(&PROFORMAS_SAVED_TOTAL);
    Lazy::force(&DOCUMENTS_RENDERED_TOTAL);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
