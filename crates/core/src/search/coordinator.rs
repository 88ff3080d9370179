//! Debounced search coordinator.
//!
//! Every query change bumps a generation counter. A search only goes out if
//! the generation is unchanged after the debounce delay, and its results are
//! only applied if the generation is still unchanged when they arrive, so the
//! most recently issued query always wins regardless of response order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::catalog::{CatalogEvent, ChangeNotifier};
use crate::feed::{FeedClient, Game};
use crate::metrics::{SEARCH_REQUESTS, SEARCH_RESULTS};
use crate::view;

use super::config::SearchConfig;

/// Visible search state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchState {
    /// The current query string. Empty means no filter.
    pub query: String,
    /// Results of the last applied search.
    pub results: Vec<Game>,
    /// Query that `results` belong to.
    pub results_query: String,
    /// A search for `query` is waiting on the debounce or the feed.
    pub pending: bool,
    /// Error from the last search for `query`, if it failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchState {
    /// Whether a non-blank query is set.
    pub fn is_filtering(&self) -> bool {
        !self.query.trim().is_empty()
    }
}

/// Owns the search query and applies remote search results to it.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SearchCoordinator {
    config: SearchConfig,
    feed: Arc<dyn FeedClient>,
    notifier: ChangeNotifier,
    state: Arc<RwLock<SearchState>>,
    generation: Arc<AtomicU64>,
}

impl SearchCoordinator {
    pub fn new(config: SearchConfig, feed: Arc<dyn FeedClient>, notifier: ChangeNotifier) -> Self {
        Self {
            config,
            feed,
            notifier,
            state: Arc::new(RwLock::new(SearchState::default())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub async fn state(&self) -> SearchState {
        self.state.read().await.clone()
    }

    pub async fn query(&self) -> String {
        self.state.read().await.query.clone()
    }

    /// Replace the query and schedule a debounced search.
    ///
    /// Returns the handle of the scheduled search, or `None` when nothing was
    /// scheduled (unchanged or blank query). A blank query clears results
    /// without contacting the feed.
    pub async fn set_query(&self, query: impl Into<String>) -> Option<JoinHandle<()>> {
        let query = query.into();
        let generation = self.begin(&query, false).await?;

        let this = self.clone();
        Some(tokio::spawn(async move {
            if this.config.debounce_ms > 0 {
                tokio::time::sleep(Duration::from_millis(this.config.debounce_ms)).await;
            }
            if this.generation.load(Ordering::SeqCst) != generation {
                debug!("Search for {:?} superseded before it was issued", query);
                SEARCH_REQUESTS.with_label_values(&["debounced"]).inc();
                return;
            }
            this.execute(generation, &query).await;
        }))
    }

    /// Replace the query and search immediately, bypassing the debounce.
    pub async fn search_now(&self, query: impl Into<String>) -> SearchState {
        let query = query.into();
        if let Some(generation) = self.begin(&query, true).await {
            self.execute(generation, &query).await;
        }
        self.state().await
    }

    /// Drop any pending search. Results that arrive afterwards are discarded.
    pub async fn cancel(&self) {
        let mut state = self.state.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        state.pending = false;
    }

    /// Record a new query and return its generation, or `None` if there is
    /// nothing to search for.
    async fn begin(&self, query: &str, force: bool) -> Option<u64> {
        let blank = query.trim().is_empty();

        let mut state = self.state.write().await;
        // An unchanged query only searches again if its last search failed
        // or was cancelled.
        let settled = blank || state.pending || state.results_query == query;
        if state.query == query && settled && !force {
            return None;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        state.query = query.to_string();
        state.error = None;
        if blank {
            state.results.clear();
            state.results_query.clear();
            state.pending = false;
        } else {
            state.pending = true;
        }
        drop(state);

        self.notifier.notify(CatalogEvent::QueryChanged {
            query: query.to_string(),
        });

        if blank {
            debug!("Search query cleared");
            None
        } else {
            Some(generation)
        }
    }

    async fn execute(&self, generation: u64, query: &str) {
        debug!("Searching {} for {:?}", self.feed.name(), query);
        let result = view::search(self.feed.as_ref(), query).await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding stale results for {:?}", query);
            SEARCH_REQUESTS.with_label_values(&["discarded"]).inc();
            return;
        }

        state.pending = false;
        match result {
            Ok(results) => {
                let count = results.len();
                state.results = results;
                state.results_query = query.to_string();
                state.error = None;
                drop(state);

                SEARCH_REQUESTS.with_label_values(&["applied"]).inc();
                SEARCH_RESULTS.with_label_values(&[]).observe(count as f64);
                debug!("Search for {:?} returned {} games", query, count);
                self.notifier.notify(CatalogEvent::SearchResults {
                    query: query.to_string(),
                    count,
                });
            }
            Err(e) => {
                let message = e.to_string();
                state.results.clear();
                state.results_query.clear();
                state.error = Some(message.clone());
                drop(state);

                SEARCH_REQUESTS.with_label_values(&["failed"]).inc();
                warn!("Search for {:?} failed: {}", query, message);
                self.notifier.notify(CatalogEvent::SearchFailed {
                    query: query.to_string(),
                    message,
                });
            }
        }
    }
}
