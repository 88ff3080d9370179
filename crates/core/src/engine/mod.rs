//! Catalog synchronization engine.
//!
//! The engine ties the pieces together:
//! - **Store**: deduplicated games plus the sync cursor
//! - **Sync driver**: single-flight background page fetching
//! - **Search**: debounced remote search, latest query wins
//! - **Views**: categories, browse pages, lookups and recommendations

mod catalog_engine;
mod config;
mod types;

pub use catalog_engine::CatalogEngine;
pub use config::EngineConfig;
pub use types::{BrowseSource, BrowseView, CategorySummary, EngineStatus, LookupError};
