//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Feed requests (listing pages, search, single-game lookups)
//! - Catalog synchronization (pages, merged items, failures)
//! - Debounced search (issued, applied, discarded)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Feed Metrics
// =============================================================================

/// Feed requests total.
pub static FEED_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("gamehub_feed_requests_total", "Total feed requests"),
        &["service", "operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

/// Feed request duration.
pub static FEED_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "gamehub_feed_request_duration_seconds",
            "Duration of feed requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["service", "operation"],
    )
    .unwrap()
});

// =============================================================================
// Sync Metrics
// =============================================================================

/// Pages fetched by the sync driver.
pub static SYNC_PAGES_FETCHED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "gamehub_sync_pages_fetched_total",
        "Total feed pages fetched by the sync driver",
    )
    .unwrap()
});

/// Items newly added to the catalog.
pub static SYNC_ITEMS_MERGED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "gamehub_sync_items_merged_total",
        "Total games added to the catalog",
    )
    .unwrap()
});

/// Page fetches that failed.
pub static SYNC_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "gamehub_sync_failures_total",
        "Total failed page fetches",
    )
    .unwrap()
});

/// Games currently held in the catalog.
pub static CATALOG_ITEMS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("gamehub_catalog_items", "Number of games in the catalog").unwrap()
});

// =============================================================================
// Search Metrics
// =============================================================================

/// Search requests by outcome.
pub static SEARCH_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("gamehub_search_requests_total", "Total remote searches"),
        &["result"], // "applied", "debounced", "discarded", "failed"
    )
    .unwrap()
});

/// Results returned per applied search.
pub static SEARCH_RESULTS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "gamehub_search_results",
            "Number of search results returned per query",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 96.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Feed
        Box::new(FEED_REQUESTS.clone()),
        Box::new(FEED_REQUEST_DURATION.clone()),
        // Sync
        Box::new(SYNC_PAGES_FETCHED.clone()),
        Box::new(SYNC_ITEMS_MERGED.clone()),
        Box::new(SYNC_FAILURES.clone()),
        Box::new(CATALOG_ITEMS.clone()),
        // Search
        Box::new(SEARCH_REQUESTS.clone()),
        Box::new(SEARCH_RESULTS.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register_cleanly() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }

        SYNC_PAGES_FETCHED.inc();
        SEARCH_REQUESTS.with_label_values(&["applied"]).inc();

        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|mf| mf.get_name().to_string())
            .collect();
        assert!(names.contains(&"gamehub_sync_pages_fetched_total".to_string()));
        assert!(names.contains(&"gamehub_search_requests_total".to_string()));
    }
}
