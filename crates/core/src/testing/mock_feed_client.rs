//! Mock feed client for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::feed::{FeedClient, FeedError, FeedPage, Game};

/// A recorded feed call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedFeedCall {
    FetchPage { page: u32, page_size: u32 },
    Search { query: String },
    GetItem { id: String },
}

/// Mock implementation of the FeedClient trait.
///
/// Provides controllable behavior for testing:
/// - Return configured pages, search results and single games
/// - Track calls for assertions
/// - Inject per-page or one-shot failures
/// - Delay responses to exercise in-flight behavior
///
/// # Example
///
/// ```rust,ignore
/// use gamehub_core::testing::{MockFeedClient, fixtures};
///
/// let feed = MockFeedClient::new();
/// feed.set_page(1, fixtures::games(0..96, "puzzle"), true).await;
/// feed.set_page(2, fixtures::games(96..120, "puzzle"), false).await;
///
/// let page = feed.fetch_page(1, 96).await?;
/// assert!(page.has_next());
/// ```
#[derive(Debug)]
pub struct MockFeedClient {
    /// Pages by index.
    pages: Arc<RwLock<HashMap<u32, FeedPage>>>,
    /// Canned search results by exact query.
    search_results: Arc<RwLock<HashMap<String, Vec<Game>>>>,
    /// Extra games only reachable through `get_item`.
    games: Arc<RwLock<HashMap<String, Game>>>,
    /// Recorded calls.
    calls: Arc<RwLock<Vec<RecordedFeedCall>>>,
    /// One-shot errors for specific pages.
    page_errors: Arc<RwLock<HashMap<u32, FeedError>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<FeedError>>>,
    /// Delay applied to every response.
    delay: Arc<RwLock<Duration>>,
    /// Per-query delay for search, overriding `delay`.
    search_delays: Arc<RwLock<HashMap<String, Duration>>>,
    fetches_in_flight: Arc<AtomicUsize>,
    max_fetches_in_flight: Arc<AtomicUsize>,
}

impl Default for MockFeedClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFeedClient {
    /// Create a new empty mock feed.
    pub fn new() -> Self {
        Self {
            pages: Arc::new(RwLock::new(HashMap::new())),
            search_results: Arc::new(RwLock::new(HashMap::new())),
            games: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            page_errors: Arc::new(RwLock::new(HashMap::new())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            search_delays: Arc::new(RwLock::new(HashMap::new())),
            fetches_in_flight: Arc::new(AtomicUsize::new(0)),
            max_fetches_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    // =========================================================================
    // Listing Configuration
    // =========================================================================

    /// Configure a listing page. `has_next` controls the next-page token.
    pub async fn set_page(&self, page: u32, items: Vec<Game>, has_next: bool) {
        let next_page = has_next.then(|| format!("mock://feed?page={}", page + 1));
        self.pages
            .write()
            .await
            .insert(page, FeedPage::new(items, next_page));
    }

    /// Split `games` into pages of `page_size`, linking all but the last.
    pub async fn set_catalog(&self, games: Vec<Game>, page_size: usize) {
        let mut pages = self.pages.write().await;
        pages.clear();

        let chunks: Vec<Vec<Game>> = games
            .chunks(page_size.max(1))
            .map(|chunk| chunk.to_vec())
            .collect();
        let last = chunks.len();
        for (i, chunk) in chunks.into_iter().enumerate() {
            let page = i as u32 + 1;
            let next_page = (page as usize != last).then(|| format!("mock://feed?page={}", page + 1));
            pages.insert(page, FeedPage::new(chunk, next_page));
        }
    }

    /// Every game on any configured page, in page order.
    pub async fn all_listed(&self) -> Vec<Game> {
        let pages = self.pages.read().await;
        let mut indexes: Vec<&u32> = pages.keys().collect();
        indexes.sort();
        indexes
            .into_iter()
            .flat_map(|i| pages[i].items.clone())
            .collect()
    }

    // =========================================================================
    // Search / Lookup Configuration
    // =========================================================================

    /// Canned results for an exact query.
    pub async fn set_search_results(&self, query: &str, results: Vec<Game>) {
        self.search_results
            .write()
            .await
            .insert(query.to_string(), results);
    }

    /// Make a game available through `get_item` only.
    pub async fn add_game(&self, game: Game) {
        self.games.write().await.insert(game.id.clone(), game);
    }

    // =========================================================================
    // Timing
    // =========================================================================

    /// Delay every response by `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Delay responses for a specific search query.
    pub async fn set_search_delay(&self, query: &str, delay: Duration) {
        self.search_delays
            .write()
            .await
            .insert(query.to_string(), delay);
    }

    // =========================================================================
    // Call Recording
    // =========================================================================

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedFeedCall> {
        self.calls.read().await.clone()
    }

    /// Page indexes requested so far, in order.
    pub async fn page_requests(&self) -> Vec<u32> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|c| match c {
                RecordedFeedCall::FetchPage { page, .. } => Some(*page),
                _ => None,
            })
            .collect()
    }

    /// Search queries issued so far, in order.
    pub async fn search_requests(&self) -> Vec<String> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|c| match c {
                RecordedFeedCall::Search { query } => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    /// Get the number of calls performed.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Clear recorded calls.
    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
    }

    /// Highest number of page fetches that were ever outstanding at once.
    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_fetches_in_flight.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Fail the next request for `page` with `error`.
    pub async fn fail_page(&self, page: u32, error: FeedError) {
        self.page_errors.write().await.insert(page, error);
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: FeedError) {
        *self.next_error.write().await = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
        self.page_errors.write().await.clear();
    }

    async fn take_error(&self) -> Option<FeedError> {
        self.next_error.write().await.take()
    }

    async fn record(&self, call: RecordedFeedCall) {
        self.calls.write().await.push(call);
    }

    async fn wait(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl FeedClient for MockFeedClient {
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<FeedPage, FeedError> {
        self.record(RecordedFeedCall::FetchPage { page, page_size })
            .await;

        let now = self.fetches_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_fetches_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.delay.read().await;
        self.wait(delay).await;
        self.fetches_in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(error) = self.take_error().await {
            return Err(error);
        }
        if let Some(error) = self.page_errors.write().await.remove(&page) {
            return Err(error);
        }

        // Past the configured pages the feed is exhausted.
        Ok(self
            .pages
            .read()
            .await
            .get(&page)
            .cloned()
            .unwrap_or_default())
    }

    async fn search_items(&self, query: &str) -> Result<Vec<Game>, FeedError> {
        self.record(RecordedFeedCall::Search {
            query: query.to_string(),
        })
        .await;

        let delay = match self.search_delays.read().await.get(query) {
            Some(d) => *d,
            None => *self.delay.read().await,
        };
        self.wait(delay).await;

        if let Some(error) = self.take_error().await {
            return Err(error);
        }

        if let Some(results) = self.search_results.read().await.get(query) {
            return Ok(results.clone());
        }

        let needle = query.to_lowercase();
        Ok(self
            .all_listed()
            .await
            .into_iter()
            .filter(|g| g.title.to_lowercase().contains(&needle))
            .collect())
    }

    async fn get_item(&self, id: &str) -> Result<Game, FeedError> {
        self.record(RecordedFeedCall::GetItem { id: id.to_string() })
            .await;

        let delay = *self.delay.read().await;
        self.wait(delay).await;

        if let Some(error) = self.take_error().await {
            return Err(error);
        }

        if let Some(game) = self.games.read().await.get(id) {
            return Ok(game.clone());
        }

        self.all_listed()
            .await
            .into_iter()
            .find(|g| g.id == id)
            .ok_or_else(|| FeedError::NotFound(format!("Game {}", id)))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
