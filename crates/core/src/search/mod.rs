//! Debounced, last-writer-wins remote search over the feed.

mod config;
mod coordinator;

pub use config::SearchConfig;
pub use coordinator::{SearchCoordinator, SearchState};
