//! Catalog synchronization.
//!
//! The driver walks the feed page by page:
//! - **Single-flight**: at most one page request is outstanding at a time
//! - **Auto-continue**: each successful page schedules the next one
//! - **Terminal states**: a short or final page completes the catalog; a
//!   transport error marks it failed until an explicit reset

mod config;
mod driver;
mod types;

pub use config::SyncConfig;
pub use driver::SyncDriver;
pub use types::{Launch, StepOutcome, SyncPhase, SyncStatus};
