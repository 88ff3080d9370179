//! GamePix JSON feed client.
//!
//! The feed is public and keyed by a site ID (`sid`). Listing and search share
//! one endpoint; single games live under `/{id}`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{FeedPage, Game};
use super::{FeedClient, FeedError};
use crate::metrics::{FEED_REQUESTS, FEED_REQUEST_DURATION};

/// Largest page the feed serves; it returns at most this many games per page.
pub const MAX_PAGE_SIZE: u32 = 96;

/// GamePix feed client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamePixConfig {
    /// Feed base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Site ID sent with every request.
    #[serde(default = "default_sid")]
    pub sid: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum number of results requested from the search endpoint.
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
}

fn default_base_url() -> String {
    "https://feeds.gamepix.com/v2/json".to_string()
}

fn default_sid() -> String {
    "S7100".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_search_limit() -> u32 {
    96
}

impl Default for GamePixConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            sid: default_sid(),
            timeout_secs: default_timeout_secs(),
            search_limit: default_search_limit(),
        }
    }
}

/// GamePix feed client.
pub struct GamePixClient {
    client: Client,
    base_url: String,
    sid: String,
    search_limit: u32,
}

impl GamePixClient {
    /// Create a new client.
    pub fn new(config: GamePixConfig) -> Result<Self, FeedError> {
        if config.sid.trim().is_empty() {
            return Err(FeedError::NotConfigured(
                "GamePix site ID is required".to_string(),
            ));
        }
        if config.base_url.trim().is_empty() {
            return Err(FeedError::NotConfigured(
                "GamePix base URL is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            sid: config.sid,
            search_limit: config.search_limit,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_listing(
        &self,
        operation: &str,
        params: &[(&str, String)],
    ) -> Result<GamesResponse, FeedError> {
        let start = Instant::now();

        let result: Result<GamesResponse, FeedError> = async {
            let response = self
                .client
                .get(&self.base_url)
                .query(&[("sid", self.sid.as_str())])
                .query(params)
                .send()
                .await?;

            let response = check_status(response, "listing").await?;

            response.json::<GamesResponse>().await.map_err(|e| {
                FeedError::Parse(format!("Failed to parse {} response: {}", operation, e))
            })
        }
        .await;

        record(operation, start, result.is_ok());
        result
    }
}

#[async_trait]
impl FeedClient for GamePixClient {
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<FeedPage, FeedError> {
        debug!("GamePix fetch page: page={}, page_size={}", page, page_size);

        let listing = self
            .get_listing(
                "fetch_page",
                &[
                    ("pagination", page_size.to_string()),
                    ("page", page.to_string()),
                ],
            )
            .await?;

        Ok(listing.into())
    }

    async fn search_items(&self, query: &str) -> Result<Vec<Game>, FeedError> {
        debug!("GamePix search: query='{}'", query);

        let listing = self
            .get_listing(
                "search",
                &[
                    ("q", query.to_string()),
                    ("pagination", self.search_limit.to_string()),
                ],
            )
            .await?;

        Ok(listing.items)
    }

    async fn get_item(&self, id: &str) -> Result<Game, FeedError> {
        let url = format!("{}/{}", self.base_url, urlencoding::encode(id));
        let start = Instant::now();

        debug!("GamePix get game: id={}", id);

        let result: Result<Game, FeedError> = async {
            let response = self
                .client
                .get(&url)
                .query(&[("sid", self.sid.as_str())])
                .send()
                .await?;

            let response = check_status(response, &format!("Game {}", id)).await?;

            response.json::<Game>().await.map_err(|e| {
                FeedError::Parse(format!("Failed to parse game response: {}", e))
            })
        }
        .await;

        record("get_item", start, result.is_ok());
        result
    }

    fn name(&self) -> &str {
        "gamepix"
    }
}

/// Map non-success statuses onto feed errors.
async fn check_status(response: Response, resource: &str) -> Result<Response, FeedError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == 404 {
        return Err(FeedError::NotFound(resource.to_string()));
    }
    if status == 429 {
        return Err(FeedError::RateLimitExceeded);
    }

    let body = response.text().await.unwrap_or_default();
    Err(FeedError::Api {
        status: status.as_u16(),
        message: body,
    })
}

fn record(operation: &str, start: Instant, success: bool) {
    let status = if success { "success" } else { "error" };
    FEED_REQUESTS
        .with_label_values(&["gamepix", operation, status])
        .inc();
    FEED_REQUEST_DURATION
        .with_label_values(&["gamepix", operation])
        .observe(start.elapsed().as_secs_f64());
}

// ============================================================================
// GamePix API Response Types (private)
// ============================================================================

/// Listing envelope. Only the fields the sync needs are decoded.
#[derive(Debug, Deserialize)]
struct GamesResponse {
    #[serde(default)]
    next_url: Option<String>,
    #[serde(default)]
    items: Vec<Game>,
}

impl From<GamesResponse> for FeedPage {
    fn from(r: GamesResponse) -> Self {
        let next_page = r.next_url.filter(|url| !url.trim().is_empty());
        FeedPage::new(r.items, next_page)
    }
}
