//! Catalog sync driver.
//!
//! Pulls pages from the feed one at a time, merges them into the catalog and
//! advances the cursor until the feed runs out or a fetch fails.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex, MutexGuard, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::catalog::{CatalogEvent, CatalogStore, ChangeNotifier};
use crate::feed::FeedClient;
use crate::metrics::{CATALOG_ITEMS, SYNC_FAILURES, SYNC_ITEMS_MERGED, SYNC_PAGES_FETCHED};

use super::config::SyncConfig;
use super::types::{Launch, StepOutcome, SyncPhase, SyncStatus};

/// Clears the running flag when the loop body ends, including on panic or abort.
struct RunningFlag<'a>(&'a AtomicBool);

impl Drop for RunningFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Single-flight driver that fills a `CatalogStore` from the feed.
pub struct SyncDriver {
    config: SyncConfig,
    feed: Arc<dyn FeedClient>,
    store: Arc<RwLock<CatalogStore>>,
    notifier: ChangeNotifier,
    phase: RwLock<SyncPhase>,
    /// Held for the whole of a fetch-and-merge iteration.
    in_flight: Mutex<()>,
    running: AtomicBool,
    /// A launch found the loop still running and wants another pass.
    rerun: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
}

impl SyncDriver {
    /// Create a driver over a shared catalog.
    pub fn new(
        config: SyncConfig,
        feed: Arc<dyn FeedClient>,
        store: Arc<RwLock<CatalogStore>>,
        notifier: ChangeNotifier,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            config,
            feed,
            store,
            notifier,
            phase: RwLock::new(SyncPhase::Idle),
            in_flight: Mutex::new(()),
            running: AtomicBool::new(false),
            rerun: AtomicBool::new(false),
            shutdown_tx,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub async fn phase(&self) -> SyncPhase {
        *self.phase.read().await
    }

    pub async fn status(&self) -> SyncStatus {
        SyncStatus {
            phase: self.phase().await,
            running: self.is_running(),
            shut_down: self.is_shut_down(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    async fn set_phase(&self, phase: SyncPhase) {
        *self.phase.write().await = phase;
    }

    /// Run one fetch-and-merge iteration.
    ///
    /// Never fails: transport errors are recorded on the catalog and reported
    /// as [`StepOutcome::Failed`].
    pub async fn step(&self) -> StepOutcome {
        match self.in_flight.try_lock() {
            Ok(guard) => self.step_locked(guard).await,
            Err(_) => {
                debug!("Page fetch already in flight");
                StepOutcome::Busy
            }
        }
    }

    /// One iteration, with the single-flight guard already held.
    async fn step_locked(&self, _guard: MutexGuard<'_, ()>) -> StepOutcome {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        if *shutdown_rx.borrow_and_update() {
            return StepOutcome::Abandoned;
        }

        let cursor = {
            let store = self.store.read().await;
            if store.is_terminal() {
                return StepOutcome::Terminal;
            }
            store.cursor()
        };

        let page_size = self.config.page_size;
        self.set_phase(SyncPhase::Fetching).await;
        debug!(
            "Fetching page {} (size {}) from {}",
            cursor,
            page_size,
            self.feed.name()
        );

        let result = tokio::select! {
            _ = shutdown_rx.changed() => {
                info!("Sync shut down with page {} in flight, discarding result", cursor);
                self.set_phase(SyncPhase::Idle).await;
                return StepOutcome::Abandoned;
            }
            result = self.feed.fetch_page(cursor, page_size) => result,
        };

        match result {
            Ok(page) => {
                SYNC_PAGES_FETCHED.inc();
                self.set_phase(SyncPhase::Merging).await;

                // A short page is the end of the feed even if a next token came back.
                let received = page.items.len();
                let has_more = page.has_next() && received >= page_size as usize;
                if page.has_next() && !has_more {
                    warn!(
                        "Page {} returned {} of {} games but a next page; treating it as the last",
                        cursor, received, page_size
                    );
                }

                let mut store = self.store.write().await;
                let added = store.merge(page.items);
                let total = store.len();

                SYNC_ITEMS_MERGED.inc_by(added as u64);
                CATALOG_ITEMS.set(total as i64);

                if has_more {
                    let next = store.advance_cursor();
                    drop(store);

                    debug!(
                        "Page {} merged: {} received, {} new, {} total",
                        cursor, received, added, total
                    );
                    if added > 0 {
                        self.notifier.notify(CatalogEvent::ItemsMerged {
                            added,
                            total,
                            cursor: next,
                        });
                    }
                    self.set_phase(SyncPhase::Idle).await;
                    StepOutcome::Advanced {
                        added,
                        cursor: next,
                    }
                } else {
                    store.mark_complete();
                    drop(store);

                    info!("Catalog sync complete: {} games after page {}", total, cursor);
                    if added > 0 {
                        self.notifier.notify(CatalogEvent::ItemsMerged {
                            added,
                            total,
                            cursor,
                        });
                    }
                    self.notifier.notify(CatalogEvent::Completed { total });
                    self.set_phase(SyncPhase::Complete).await;
                    StepOutcome::Completed { added }
                }
            }
            Err(e) => {
                SYNC_FAILURES.inc();
                let message = e.to_string();
                warn!("Failed to fetch page {}: {}", cursor, message);

                self.store.write().await.mark_failed(message.clone());
                self.notifier.notify(CatalogEvent::Failed {
                    message: message.clone(),
                });
                self.set_phase(SyncPhase::Failed).await;
                StepOutcome::Failed { message }
            }
        }
    }

    /// Iterate until the catalog is complete, a fetch fails, or (in manual
    /// mode) after a single page. Returns the phase the driver stopped in.
    pub async fn run(&self) -> SyncPhase {
        loop {
            // Wait out a manually triggered fetch instead of stopping on it.
            let guard = self.in_flight.lock().await;
            let outcome = self.step_locked(guard).await;
            if !outcome.should_continue() || !self.config.auto_continue {
                break;
            }
            if self.config.page_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.page_delay_ms)).await;
            }
        }
        self.phase().await
    }

    /// Run the sync loop as a background task.
    ///
    /// Returns `None` when a loop is already running or the driver was shut down.
    pub fn spawn(self: &Arc<Self>) -> Option<JoinHandle<SyncPhase>> {
        if self.is_shut_down() {
            warn!("Sync driver is shut down, not starting");
            return None;
        }
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("Sync loop already running");
            return None;
        }

        let driver = Arc::clone(self);
        Some(tokio::spawn(async move {
            info!("Catalog sync loop started");
            loop {
                let phase = {
                    let _running = RunningFlag(&driver.running);
                    driver.run().await
                };
                if !driver.claim_rerun() {
                    info!("Catalog sync loop stopped ({})", phase);
                    return phase;
                }
                debug!("Sync requested while the loop was stopping, continuing");
            }
        }))
    }

    /// Spawn the loop, or hand the request to a loop that is still stopping.
    pub fn launch(self: &Arc<Self>) -> Launch {
        if self.is_shut_down() {
            return Launch::ShutDown;
        }
        // Set before the running check so a stopping loop cannot miss it.
        self.rerun.store(true, Ordering::SeqCst);
        match self.spawn() {
            Some(handle) => {
                self.rerun.store(false, Ordering::SeqCst);
                Launch::Started(handle)
            }
            None if self.is_shut_down() => Launch::ShutDown,
            None => Launch::Continuing,
        }
    }

    /// Called by a loop after its running flag dropped. Takes the running
    /// flag back if a launch arrived in the meantime.
    fn claim_rerun(&self) -> bool {
        self.rerun.swap(false, Ordering::SeqCst)
            && !self.is_shut_down()
            && !self.running.swap(true, Ordering::SeqCst)
    }

    /// Clear a failure so sync can resume from the current cursor.
    ///
    /// Returns `false` when the catalog was not failed.
    pub async fn reset(&self) -> bool {
        {
            let mut store = self.store.write().await;
            if !store.is_failed() {
                return false;
            }
            store.reset();
            info!("Catalog sync reset, resuming at page {}", store.cursor());
        }
        self.set_phase(SyncPhase::Idle).await;
        self.notifier.notify(CatalogEvent::Reset);
        true
    }

    /// Stop the driver. An in-flight page fetch is abandoned and its result
    /// discarded; no further pages are requested.
    pub fn shutdown(&self) {
        if !self.shutdown_tx.send_replace(true) {
            info!("Catalog sync driver shutting down");
        }
    }
}
