//! Testing utilities and mock implementations.
//!
//! This module provides a mock of the feed client so the sync driver,
//! search and engine can be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use gamehub_core::testing::{fixtures, MockFeedClient};
//!
//! let feed = MockFeedClient::new();
//! feed.set_catalog(fixtures::games(0..200, "puzzle"), 96).await;
//!
//! // Use in CatalogEngine::new(...)
//! ```

mod mock_feed_client;

pub use mock_feed_client::{MockFeedClient, RecordedFeedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::ops::Range;

    use crate::feed::Game;

    /// Create a test game with reasonable defaults.
    pub fn game(id: &str, category: &str) -> Game {
        Game {
            id: id.to_string(),
            title: format!("Game {}", id),
            namespace: format!("ns-{}", id),
            description: format!("A {} game.", category),
            category: category.to_string(),
            orientation: "landscape".to_string(),
            quality_score: 0.75,
            width: 800,
            height: 600,
            date_modified: "2024-02-01T00:00:00Z".to_string(),
            date_published: "2024-01-01T00:00:00Z".to_string(),
            banner_image: format!("https://img.example.com/{}/banner.png", id),
            image: format!("https://img.example.com/{}/icon.png", id),
            url: format!("https://play.example.com/{}", id),
        }
    }

    /// Create a test game with a specific title.
    pub fn titled_game(id: &str, title: &str, category: &str) -> Game {
        Game {
            title: title.to_string(),
            ..game(id, category)
        }
    }

    /// Create games `game-{n}` for every `n` in `range`.
    pub fn games(range: Range<usize>, category: &str) -> Vec<Game> {
        range
            .map(|n| game(&format!("game-{}", n), category))
            .collect()
    }
}
