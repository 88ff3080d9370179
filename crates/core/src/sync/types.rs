//! Types for the catalog sync driver.

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

/// Where the sync driver currently is.
///
/// `Idle -> Fetching -> Merging -> (Fetching | Complete | Failed)`.
/// `Failed` only leaves via an explicit reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Idle,
    Fetching,
    Merging,
    Complete,
    Failed,
}

impl SyncPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncPhase::Idle => "idle",
            SyncPhase::Fetching => "fetching",
            SyncPhase::Merging => "merging",
            SyncPhase::Complete => "complete",
            SyncPhase::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncPhase::Complete | SyncPhase::Failed)
    }
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single sync iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Page merged and more pages remain.
    Advanced { added: usize, cursor: u32 },
    /// Last page merged; the catalog is complete.
    Completed { added: usize },
    /// The page fetch failed; the catalog is marked failed.
    Failed { message: String },
    /// The catalog is already complete or failed, nothing was fetched.
    Terminal,
    /// Another page fetch is already in flight.
    Busy,
    /// The driver was shut down while the fetch was outstanding.
    Abandoned,
}

impl StepOutcome {
    /// Whether the loop should go on to the next page.
    pub fn should_continue(&self) -> bool {
        matches!(self, StepOutcome::Advanced { .. })
    }
}

/// Driver status for observers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncStatus {
    pub phase: SyncPhase,
    /// A background sync loop is currently active.
    pub running: bool,
    /// The driver was shut down and will not fetch again.
    pub shut_down: bool,
}


/// What asking the driver to sync again led to.
#[derive(Debug)]
pub enum Launch {
    /// A new background loop was spawned.
    Started(JoinHandle<SyncPhase>),
    /// A loop was still stopping; it picks the request up and keeps going.
    Continuing,
    /// The driver was shut down and will not sync again.
    ShutDown,
}

impl Launch {
    /// Handle of the spawned loop, when one was spawned.
    pub fn into_handle(self) -> Option<JoinHandle<SyncPhase>> {
        match self {
            Launch::Started(handle) => Some(handle),
            Launch::Continuing | Launch::ShutDown => None,
        }
    }
}
