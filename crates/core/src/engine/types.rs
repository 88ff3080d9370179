//! Types for the catalog engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::CatalogStatus;
use crate::feed::{FeedError, Game};
use crate::sync::SyncStatus;
use crate::view::Paged;

/// Errors from looking up a single game.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Not in the catalog yet, and the catalog is still syncing.
    #[error("game not synced yet: {0}")]
    NotYetSynced(String),

    /// Definitely absent: the catalog is complete or the feed says so.
    #[error("game not found: {0}")]
    NotFound(String),

    /// The feed could not be asked.
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),
}

impl LookupError {
    /// Whether the game is known not to exist.
    pub fn is_definitive(&self) -> bool {
        matches!(self, LookupError::NotFound(_))
    }
}

/// Where a browse view took its games from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowseSource {
    /// The whole catalog; no query is set.
    Catalog,
    /// Remote search results for the current query.
    Search,
    /// Local filter over the catalog while the remote search is outstanding
    /// or has failed.
    Local,
}

/// One page of whatever the consumer is currently browsing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrowseView {
    pub source: BrowseSource,
    /// The active query, empty when not filtering.
    pub query: String,
    pub page: Paged<Game>,
    /// The catalog has been fully synced.
    pub complete: bool,
}

/// A category with its display label and game count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategorySummary {
    pub category: String,
    pub label: String,
    pub count: usize,
}

/// Combined engine status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineStatus {
    pub catalog: CatalogStatus,
    pub sync: SyncStatus,
    pub query: String,
    pub search_pending: bool,
}
