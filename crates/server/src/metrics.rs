//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the StreamHub server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Download stream (SSE) connections
//! - Tracked downloads by status (collected dynamically)
//!
//! Core metrics (searches, cache lookups, lifecycle polls) are registered
//! into the same registry.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry, TextEncoder,
};
use regex_lite::Regex;
use streamhub_core::DownloadStatus;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "streamhub_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("streamhub_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "streamhub_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Stream Metrics
// =============================================================================

/// Download status streams opened (cumulative).
pub static SSE_STREAMS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "streamhub_sse_streams_total",
        "Download status streams opened since startup",
    )
    .unwrap()
});

// =============================================================================
// Download Metrics (collected dynamically)
// =============================================================================

/// Tracked downloads by current status.
pub static DOWNLOADS_BY_STATUS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new(
            "streamhub_downloads_by_status",
            "Tracked downloads by current status",
        ),
        &["status"],
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Streams
    registry
        .register(Box::new(SSE_STREAMS_TOTAL.clone()))
        .unwrap();

    // Downloads
    registry
        .register(Box::new(DOWNLOADS_BY_STATUS.clone()))
        .unwrap();

    // Core metrics (search, cache, lifecycle)
    for metric in streamhub_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the status gauges reflect the store. Never
/// contacts the provider.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let records = state.downloads().list().await;
    for status in [
        DownloadStatus::Initializing,
        DownloadStatus::Downloading,
        DownloadStatus::Completed,
        DownloadStatus::Error,
    ] {
        let count = records.iter().filter(|r| r.status == status).count();
        DOWNLOADS_BY_STATUS
            .with_label_values(&[status.as_str()])
            .set(count as i64);
    }
}

static UUID_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap()
});
static HASH_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9a-fA-F]{40}").unwrap());
static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = UUID_SEGMENT.replace_all(path, "{id}");
    let result = HASH_SEGMENT.replace_all(&result, "{hash}");
    let result = NUMERIC_SEGMENT.replace_all(&result, "/{id}$1");
    result.to_string()
}
