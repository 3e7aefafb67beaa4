//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Source search (Jackett queries, candidates returned)
//! - Cache lookups against the download provider
//! - Download lifecycle (job creation, status polls, subscriptions)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Source Search Metrics
// =============================================================================

/// Source searches by result.
pub static SOURCE_SEARCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("streamhub_source_searches_total", "Total source searches"),
        &["result"], // "success", "invalid", "upstream_error"
    )
    .unwrap()
});

/// Candidates returned per search, after ranking and truncation.
pub static CANDIDATES_RETURNED: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "streamhub_candidates_returned",
            "Number of ranked candidates returned per search",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
        &[],
    )
    .unwrap()
});

/// Bulk cache lookups by outcome.
pub static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "streamhub_cache_lookups_total",
            "Bulk cache lookups against the download provider",
        ),
        &["result"], // "ok", "failed", "skipped"
    )
    .unwrap()
});

// =============================================================================
// Download Lifecycle Metrics
// =============================================================================

/// Job creation requests by result.
pub static JOBS_CREATED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("streamhub_jobs_created_total", "Download job creation attempts"),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// Status polls by outcome.
pub static STATUS_POLLS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("streamhub_status_polls_total", "Download status polls"),
        &["outcome"], // "matched", "unmatched", "failed", "terminal"
    )
    .unwrap()
});

/// Status transitions applied to download records.
pub static STATUS_TRANSITIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "streamhub_status_transitions_total",
            "Download status transitions",
        ),
        &["from_status", "to_status"],
    )
    .unwrap()
});

/// Stream subscriptions currently polling.
pub static SUBSCRIPTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "streamhub_subscriptions_active",
        "Number of active download stream subscriptions",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Search
        Box::new(SOURCE_SEARCHES.clone()),
        Box::new(CANDIDATES_RETURNED.clone()),
        Box::new(CACHE_LOOKUPS.clone()),
        // Lifecycle
        Box::new(JOBS_CREATED.clone()),
        Box::new(STATUS_POLLS.clone()),
        Box::new(STATUS_TRANSITIONS.clone()),
        Box::new(SUBSCRIPTIONS_ACTIVE.clone()),
    ]
}
