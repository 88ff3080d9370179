//! The catalog engine: store, sync driver, search and views behind one handle.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::catalog::{
    CatalogEvent, CatalogSnapshot, CatalogStatus, CatalogStore, ChangeNotifier, Lookup,
    Subscription,
};
use crate::feed::{FeedClient, Game};
use crate::search::{SearchCoordinator, SearchState};
use crate::sync::{Launch, StepOutcome, SyncDriver, SyncPhase};
use crate::view::{self, MatchFields, Paged};

use super::config::EngineConfig;
use super::types::{BrowseSource, BrowseView, CategorySummary, EngineStatus, LookupError};

/// Owns the catalog for the lifetime of the process.
///
/// Construct one at startup and share it (it is meant to sit behind an `Arc`).
/// Views read from the catalog while the sync driver keeps filling it in the
/// background.
pub struct CatalogEngine {
    config: EngineConfig,
    feed: Arc<dyn FeedClient>,
    store: Arc<RwLock<CatalogStore>>,
    notifier: ChangeNotifier,
    driver: Arc<SyncDriver>,
    search: SearchCoordinator,
}

impl CatalogEngine {
    /// Create an engine with an empty catalog. Nothing is fetched until
    /// [`start`](Self::start) or [`load_more`](Self::load_more).
    pub fn new(config: EngineConfig, feed: Arc<dyn FeedClient>) -> Self {
        let store = Arc::new(RwLock::new(CatalogStore::new()));
        let notifier = ChangeNotifier::new(config.event_capacity.max(1));
        let driver = Arc::new(SyncDriver::new(
            config.sync.clone(),
            Arc::clone(&feed),
            Arc::clone(&store),
            notifier.clone(),
        ));
        let search = SearchCoordinator::new(
            config.search.clone(),
            Arc::clone(&feed),
            notifier.clone(),
        );

        Self {
            config,
            feed,
            store,
            notifier,
            driver,
            search,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Name of the underlying feed client.
    pub fn feed_name(&self) -> &str {
        self.feed.name()
    }

    // =========================================================================
    // Sync control
    // =========================================================================

    /// Start background sync.
    ///
    /// Returns the handle of the spawned loop, or `None` when the catalog is
    /// complete or failed, a loop is already running, or the engine was shut
    /// down. In manual mode the loop stops after one page.
    pub async fn start(&self) -> Option<JoinHandle<SyncPhase>> {
        if self.store.read().await.is_terminal() {
            debug!("Catalog is complete or failed, not starting sync");
            return None;
        }
        let handle = self.driver.spawn();
        if handle.is_some() {
            info!("Catalog sync started against {}", self.feed.name());
        }
        handle
    }

    /// Continue a sync that stopped (manual mode or after a shutdown of the
    /// view). Same rules as [`start`](Self::start).
    pub async fn resume(&self) -> Option<JoinHandle<SyncPhase>> {
        self.start().await
    }

    /// Fetch exactly one more page, in the caller's task.
    pub async fn load_more(&self) -> StepOutcome {
        self.driver.step().await
    }

    /// Clear a failure and resume from the page that failed.
    ///
    /// Returns `None` when the catalog was not failed. A loop that is still
    /// stopping after the failure takes the retry over instead of a new one
    /// being spawned ([`Launch::Continuing`]).
    pub async fn retry(&self) -> Option<Launch> {
        if !self.driver.reset().await {
            debug!("Retry requested but catalog is not failed");
            return None;
        }
        let launch = self.driver.launch();
        if let Launch::ShutDown = launch {
            warn!("Catalog reset after shutdown, sync will not resume");
        } else {
            info!("Catalog sync resumed against {}", self.feed.name());
        }
        Some(launch)
    }

    /// Stop syncing and drop any pending search. An in-flight page fetch is
    /// abandoned and its result discarded.
    pub async fn shutdown(&self) {
        info!("Shutting down catalog engine");
        self.driver.shutdown();
        self.search.cancel().await;
    }

    // =========================================================================
    // State
    // =========================================================================

    pub async fn snapshot(&self) -> CatalogSnapshot {
        self.store.read().await.snapshot()
    }

    pub async fn catalog_status(&self) -> CatalogStatus {
        self.store.read().await.status()
    }

    pub async fn status(&self) -> EngineStatus {
        let catalog = self.catalog_status().await;
        let sync = self.driver.status().await;
        let search = self.search.state().await;
        EngineStatus {
            catalog,
            sync,
            query: search.query,
            search_pending: search.pending,
        }
    }

    /// Subscribe to change events.
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.notifier.subscribe()
    }

    /// Invoke `callback` for every change event until the subscription is
    /// dropped or unsubscribed.
    pub fn on_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(CatalogEvent) + Send + Sync + 'static,
    {
        self.notifier.on_change(callback)
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Update the search query; the remote search runs after the debounce.
    pub async fn set_query(&self, query: impl Into<String>) -> Option<JoinHandle<()>> {
        self.search.set_query(query).await
    }

    pub async fn query(&self) -> String {
        self.search.query().await
    }

    pub async fn search_state(&self) -> SearchState {
        self.search.state().await
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Categories present in the catalog, preferred ones first.
    pub async fn categories(&self) -> Vec<String> {
        let store = self.store.read().await;
        view::categories(store.items(), &self.config.views.preferred_categories)
    }

    /// Categories with display labels and game counts.
    pub async fn category_summaries(&self) -> Vec<CategorySummary> {
        let store = self.store.read().await;
        view::group_by_category(store.items(), &self.config.views.preferred_categories)
            .into_iter()
            .map(|group| CategorySummary {
                count: group.games.len(),
                category: group.category,
                label: group.label,
            })
            .collect()
    }

    /// One page of the games in `category`, in catalog order.
    pub async fn games_in_category(
        &self,
        category: &str,
        offset: usize,
        limit: Option<usize>,
    ) -> Paged<Game> {
        let games = {
            let store = self.store.read().await;
            view::by_category(store.items(), category)
        };
        Paged::from_slice(&games, offset, self.limit_or_default(limit))
    }

    /// One page of whatever is being browsed.
    ///
    /// A blank query browses the whole catalog. Otherwise the remote search
    /// results are used once they have arrived for the current query; until
    /// then (or if the search failed) the locally synced games are filtered.
    pub async fn browse(&self, offset: usize, limit: Option<usize>) -> BrowseView {
        let limit = self.limit_or_default(limit);
        let search = self.search.state().await;
        let store = self.store.read().await;
        let complete = store.is_complete();

        let (source, page) = if !search.is_filtering() {
            (
                BrowseSource::Catalog,
                Paged::from_slice(store.items(), offset, limit),
            )
        } else if !search.pending && search.error.is_none() && search.results_query == search.query
        {
            (
                BrowseSource::Search,
                Paged::from_slice(&search.results, offset, limit),
            )
        } else {
            let local = view::filter_local(store.items(), &search.query, MatchFields::default());
            (BrowseSource::Local, Paged::from_slice(&local, offset, limit))
        };

        BrowseView {
            source,
            query: search.query,
            page,
            complete,
        }
    }

    /// Look a game up in the catalog only.
    pub async fn cached_game(&self, id: &str) -> Result<Game, LookupError> {
        match self.store.read().await.lookup(id) {
            Lookup::Found(game) => Ok(game),
            Lookup::Pending => Err(LookupError::NotYetSynced(id.to_string())),
            Lookup::Absent => Err(LookupError::NotFound(id.to_string())),
        }
    }

    /// Look a game up, asking the feed directly if the catalog has not
    /// reached it yet. The fetched game is not merged into the catalog.
    pub async fn game(&self, id: &str) -> Result<Game, LookupError> {
        match self.cached_game(id).await {
            Err(LookupError::NotYetSynced(_)) => {}
            other => return other,
        }

        debug!("Game {} not synced yet, asking {}", id, self.feed.name());
        match self.feed.get_item(id).await {
            Ok(game) => Ok(game),
            Err(e) if e.is_not_found() => Err(LookupError::NotFound(id.to_string())),
            Err(e) => {
                warn!("Remote lookup of game {} failed: {}", id, e);
                Err(LookupError::Feed(e))
            }
        }
    }

    /// Games to suggest next to `id`.
    pub async fn recommendations(&self, id: &str) -> Vec<Game> {
        let store = self.store.read().await;
        view::recommendations(store.items(), id, self.config.views.recommendations)
    }

    fn limit_or_default(&self, limit: Option<usize>) -> usize {
        limit.unwrap_or(self.config.views.default_page_limit)
    }
}

impl Drop for CatalogEngine {
    fn drop(&mut self) {
        self.driver.shutdown();
    }
}
