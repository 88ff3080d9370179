//! Change notification for catalog and search state.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Something observable changed in the catalog or the active search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CatalogEvent {
    /// New games were merged into the catalog.
    ItemsMerged {
        added: usize,
        total: usize,
        cursor: u32,
    },
    /// The feed reported no further pages.
    Completed { total: usize },
    /// A page fetch failed; sync is halted until retried.
    Failed { message: String },
    /// The failed flag was cleared for a retry.
    Reset,
    /// The search string changed.
    QueryChanged { query: String },
    /// Results for the current query were applied.
    SearchResults { query: String, count: usize },
    /// The search for the current query failed.
    SearchFailed { query: String, message: String },
}

impl CatalogEvent {
    /// Stable name of the event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            CatalogEvent::ItemsMerged { .. } => "items_merged",
            CatalogEvent::Completed { .. } => "completed",
            CatalogEvent::Failed { .. } => "failed",
            CatalogEvent::Reset => "reset",
            CatalogEvent::QueryChanged { .. } => "query_changed",
            CatalogEvent::SearchResults { .. } => "search_results",
            CatalogEvent::SearchFailed { .. } => "search_failed",
        }
    }
}

/// Fan-out of catalog events to any number of subscribers.
///
/// Cheap to clone; all clones share one channel.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<CatalogEvent>,
}

impl ChangeNotifier {
    /// Create a notifier with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn notify(&self, event: CatalogEvent) {
        debug!("Catalog event: {}", event.event_type());
        let _ = self.sender.send(event);
    }

    /// Subscribe to the raw event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Invoke `callback` for every event until the subscription is dropped.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(CatalogEvent) + Send + Sync + 'static,
    {
        let mut rx = self.sender.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => callback(event),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Catalog subscriber lagged, skipped {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Subscription { handle }
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Handle for a callback registered with [`ChangeNotifier::on_change`].
///
/// The callback stops receiving events when this is dropped or unsubscribed.
#[derive(Debug)]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Stop delivering events to the callback.
    pub fn unsubscribe(self) {
        drop(self);
    }

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
