//! Prometheus metrics for the module host.
//!
//! This module provides metrics for:
//! - Dashboard page requests
//! - Static asset requests
//! - Template render latency and failures

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

// === Metric Name Constants ===

/// Dashboard page requests counter metric name.
pub const METRIC_DASHBOARD_REQUESTS: &str = "dashboard_requests_total";
/// Static asset requests counter metric name.
pub const METRIC_ASSET_REQUESTS: &str = "asset_requests_total";
/// Template render failures counter metric name.
pub const METRIC_RENDER_FAILURES: &str = "template_render_failures_total";
/// Template render latency histogram metric name.
pub const METRIC_RENDER_LATENCY: &str = "template_render_latency_ms";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_RENDER_LATENCY,
        "Template render latency in milliseconds"
    );

    describe_counter!(
        METRIC_DASHBOARD_REQUESTS,
        "Total number of dashboard page requests served"
    );
    describe_counter!(
        METRIC_ASSET_REQUESTS,
        "Total number of static asset requests"
    );
    describe_counter!(
        METRIC_RENDER_FAILURES,
        "Total number of template renders that failed"
    );

    debug!("Metrics initialized");
}

/// Record a dashboard page request.
pub fn inc_dashboard_requests() {
    counter!(METRIC_DASHBOARD_REQUESTS).increment(1);
}

/// Record a static asset request.
pub fn inc_asset_requests() {
    counter!(METRIC_ASSET_REQUESTS).increment(1);
}

/// Record a failed template render.
pub fn inc_render_failures() {
    counter!(METRIC_RENDER_FAILURES).increment(1);
}

/// Record template render latency.
pub fn record_render_latency(start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_RENDER_LATENCY).record(latency_ms);
}
