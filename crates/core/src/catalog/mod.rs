//! Locally synced game catalog.
//!
//! `CatalogStore` owns the deduplicated game list and the sync cursor;
//! `ChangeNotifier` tells subscribers when any of it changes.

mod events;
mod store;

pub use events::{CatalogEvent, ChangeNotifier, Subscription};
pub use store::{CatalogSnapshot, CatalogStatus, CatalogStore, Lookup, FIRST_PAGE};
