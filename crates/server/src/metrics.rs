//! Prometheus metrics for observability.
//!
//! Request metrics cover the `/api/v1` catalog, games, search and category
//! routes, the catalog event stream has its own WebSocket counters, and the
//! catalog gauges are refreshed from the engine on every scrape.

use once_cell::sync::Lazy;
use prometheus::{
    core::Collector, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge,
    Opts, Registry, TextEncoder,
};

use crate::state::AppState;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// API Request Metrics
// =============================================================================

/// Time to answer an API request, by method, route template and status.
/// Game and category paths are folded by `normalize_path`.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "gamehub_http_request_duration_seconds",
            "Time to answer a GameHub API request in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// API requests answered, by method, route template and status.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("gamehub_http_requests_total", "GameHub API requests answered"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// API requests being handled right now. A slow remote game lookup or
/// category listing shows up here.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "gamehub_http_requests_in_flight",
        "GameHub API requests currently being handled",
    )
    .unwrap()
});

// =============================================================================
// Catalog Stream Metrics
// =============================================================================

/// Clients currently subscribed to `/api/v1/ws`.
pub static WS_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "gamehub_ws_connections_active",
        "Clients currently subscribed to the catalog event stream",
    )
    .unwrap()
});

/// Catalog stream subscriptions since startup.
pub static WS_CONNECTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "gamehub_ws_connections_total",
        "Catalog event stream subscriptions since startup",
    )
    .unwrap()
});

/// Stream messages pushed, labelled `status`, `heartbeat` or the catalog
/// event type (`items_merged`, `completed`, `search_results`, ...).
pub static WS_MESSAGES_SENT: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("gamehub_ws_messages_sent_total", "Catalog event stream messages pushed to clients"),
        &["type"],
    )
    .unwrap()
});

/// Times a stream client missed catalog events and was sent a fresh
/// status instead.
pub static WS_LAG_EVENTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "gamehub_ws_lag_events_total",
        "Catalog stream clients resynced with a status after missing events",
    )
    .unwrap()
});

// =============================================================================
// Catalog Metrics (collected dynamically)
// =============================================================================

/// Catalog fully synced (1) or not (0).
pub static CATALOG_COMPLETE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "gamehub_catalog_complete",
        "Whether the catalog has been fully synced (1) or not (0)",
    )
    .unwrap()
});

/// Catalog sync halted on an error (1) or not (0).
pub static CATALOG_FAILED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "gamehub_catalog_failed",
        "Whether catalog sync is halted on an error (1) or not (0)",
    )
    .unwrap()
});

/// Next page the sync driver will request.
pub static SYNC_CURSOR: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("gamehub_sync_cursor", "Next feed page to request").unwrap()
});

/// Background sync loop running (1) or not (0).
pub static SYNC_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "gamehub_sync_running",
        "Whether the background sync loop is running (1) or not (0)",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    let server_metrics: Vec<Box<dyn Collector>> = vec![
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
        Box::new(WS_CONNECTIONS_ACTIVE.clone()),
        Box::new(WS_CONNECTIONS_TOTAL.clone()),
        Box::new(WS_MESSAGES_SENT.clone()),
        Box::new(WS_LAG_EVENTS.clone()),
        Box::new(CATALOG_COMPLETE.clone()),
        Box::new(CATALOG_FAILED.clone()),
        Box::new(SYNC_CURSOR.clone()),
        Box::new(SYNC_RUNNING.clone()),
    ];

    let core_metrics = gamehub_core::metrics::all_metrics();
    for metric in server_metrics.into_iter().chain(core_metrics) {
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
/// Called before encoding so the catalog gauges reflect the engine right now.
pub async fn collect_dynamic_metrics(state: &AppState) {
    let status = state.engine().status().await;
    CATALOG_COMPLETE.set(status.catalog.complete as i64);
    CATALOG_FAILED.set(status.catalog.failed as i64);
    SYNC_CURSOR.set(status.catalog.cursor as i64);
    SYNC_RUNNING.set(status.sync.running as i64);
}

/// Normalize a path for metric labels (replace game IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let game_regex = regex_lite::Regex::new(r"^(/api/v1/games)/[^/]+").unwrap();
    let category_regex = regex_lite::Regex::new(r"^(/api/v1/categories)/[^/]+").unwrap();

    let result = game_regex.replace(path, "$1/{id}");
    let result = category_regex.replace(&result, "$1/{category}");
    result.to_string()
}
