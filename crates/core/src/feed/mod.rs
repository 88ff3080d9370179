//! Remote game feed access.
//!
//! The feed is a paginated JSON listing with a free-text search endpoint.
//! Transport, timeouts and response decoding are owned by the client; the
//! rest of the crate only sees the `FeedClient` trait.

mod gamepix;
mod types;

pub use gamepix::{GamePixClient, GamePixConfig, MAX_PAGE_SIZE};
pub use types::{FeedPage, Game};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Feed returned an error status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Client not configured (missing sid, bad base URL, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

impl FeedError {
    /// Whether this error says the requested resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FeedError::NotFound(_))
    }
}

/// Capability for reading the remote game feed.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Fetch one page of the listing. Pages are 1-indexed.
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<FeedPage, FeedError>;

    /// Search the remote corpus for games matching `query`.
    async fn search_items(&self, query: &str) -> Result<Vec<Game>, FeedError>;

    /// Fetch a single game by ID.
    async fn get_item(&self, id: &str) -> Result<Game, FeedError>;

    /// Short name used in logs and metrics.
    fn name(&self) -> &str {
        "feed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found() {
        assert!(FeedError::NotFound("game x".to_string()).is_not_found());
        assert!(!FeedError::RateLimitExceeded.is_not_found());
        assert!(!FeedError::Api {
            status: 500,
            message: "boom".to_string()
        }
        .is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = FeedError::Api {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 503 - unavailable");
    }
}
