//! Common test utilities for API testing with a mock feed.
//!
//! This module provides a test fixture that creates an in-process server
//! backed by a `MockFeedClient`, so the whole HTTP surface can be exercised
//! without reaching the real feed.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use gamehub_core::{
    testing::MockFeedClient, CatalogEngine, Config, FeedClient, SearchConfig, ServerConfig,
    SyncConfig, SyncPhase,
};
use gamehub_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use gamehub_core::testing::fixtures;

/// Page size used by the fixture's sync driver.
pub const PAGE_SIZE: u32 = 4;

/// Test fixture for API testing with a mock feed.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_list_games() {
///     let fixture = TestFixture::new().await;
///     fixture.feed.set_catalog(fixtures::games(0..10, "puzzle"), 4).await;
///     fixture.sync().await;
///
///     let response = fixture.get("/api/v1/games").await;
///     assert_eq!(response.body["page"]["total"], 10);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock feed - configure pages, search results and failures
    pub feed: Arc<MockFeedClient>,
    /// The engine behind the router
    pub engine: Arc<CatalogEngine>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default settings.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let feed = Arc::new(MockFeedClient::new());

        let mut config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            sync: SyncConfig {
                page_size: PAGE_SIZE,
                auto_continue: test_config.auto_continue,
                start_on_boot: false,
                ..Default::default()
            },
            search: SearchConfig {
                debounce_ms: test_config.debounce_ms,
            },
            ..Default::default()
        };
        config.views.default_page_limit = test_config.default_page_limit;

        let engine = Arc::new(CatalogEngine::new(
            config.engine_config(),
            Arc::clone(&feed) as Arc<dyn FeedClient>,
        ));

        let state = Arc::new(AppState::new(config, Arc::clone(&engine)));
        let router = create_router(state);

        Self {
            router,
            feed,
            engine,
        }
    }

    /// Run the sync loop to its end and return the final phase.
    pub async fn sync(&self) -> SyncPhase {
        match self.engine.start().await {
            Some(handle) => handle.await.expect("Sync task panicked"),
            None => self.engine.status().await.sync.phase,
        }
    }

    /// Load `games` into the feed and sync all of them.
    pub async fn synced_with(&self, games: Vec<gamehub_core::Game>) {
        self.feed.set_catalog(games, PAGE_SIZE as usize).await;
        assert_eq!(self.sync().await, SyncPhase::Complete);
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with an empty body.
    pub async fn post(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a request and return the raw body as text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Keep fetching until the feed is exhausted
    pub auto_continue: bool,
    /// Search debounce in milliseconds
    pub debounce_ms: u64,
    /// Listing page size when a request gives no limit
    pub default_page_limit: usize,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            auto_continue: true,
            debounce_ms: 20,
            default_page_limit: 48,
        }
    }
}

impl TestConfig {
    /// Create config where each start or load-more fetches one page.
    pub fn manual() -> Self {
        Self {
            auto_continue: false,
            ..Default::default()
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
