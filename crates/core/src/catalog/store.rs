//! In-memory catalog of synced games.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::feed::Game;

/// First page index requested from the feed.
pub const FIRST_PAGE: u32 = 1;

/// Deduplicated master collection plus the sync cursor.
///
/// Games are kept in first-seen order. The store does no locking of its own;
/// the sync driver is the only writer.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    items: Vec<Game>,
    /// Position of each game in `items`, keyed by ID.
    index: HashMap<String, usize>,
    cursor: u32,
    complete: bool,
    failed: bool,
    last_error: Option<String>,
}

/// Point-in-time copy of the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogSnapshot {
    pub items: Vec<Game>,
    pub cursor: u32,
    pub complete: bool,
    pub failed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Catalog counters without the item list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogStatus {
    pub total: usize,
    pub cursor: u32,
    pub complete: bool,
    pub failed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of looking a game up by ID.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// The game is in the catalog.
    Found(Game),
    /// Not synced yet; the catalog is still incomplete.
    Pending,
    /// The catalog is complete and the game is not in it.
    Absent,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    /// Create an empty catalog positioned at the first page.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            cursor: FIRST_PAGE,
            complete: false,
            failed: false,
            last_error: None,
        }
    }

    /// Insert games whose ID is not already present.
    ///
    /// Later duplicates are dropped, not overwritten. Returns the number of
    /// games actually added.
    pub fn merge(&mut self, games: Vec<Game>) -> usize {
        let before = self.items.len();
        for game in games {
            if self.index.contains_key(&game.id) {
                continue;
            }
            self.index.insert(game.id.clone(), self.items.len());
            self.items.push(game);
        }
        self.items.len() - before
    }

    /// Move the cursor to the next page. Returns the new cursor.
    pub fn advance_cursor(&mut self) -> u32 {
        self.cursor = self.cursor.saturating_add(1);
        self.cursor
    }

    /// Mark the catalog as fully loaded. Idempotent.
    pub fn mark_complete(&mut self) {
        if self.failed {
            warn!("Ignoring completion of a failed catalog");
            return;
        }
        self.complete = true;
    }

    /// Record a failed page fetch. Idempotent; games are kept.
    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        if self.complete {
            warn!("Ignoring failure on a complete catalog");
            return;
        }
        self.failed = true;
        self.last_error = Some(reason.into());
    }

    /// Clear the failed flag so sync can be retried.
    ///
    /// Games, cursor and completion are left as they are.
    pub fn reset(&mut self) {
        self.failed = false;
        self.last_error = None;
    }

    pub fn items(&self) -> &[Game] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Whether no further automatic fetching should happen.
    pub fn is_terminal(&self) -> bool {
        self.complete || self.failed
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Get a game by ID.
    pub fn get(&self, id: &str) -> Option<&Game> {
        self.index.get(id).map(|&pos| &self.items[pos])
    }

    /// Look a game up, distinguishing "not synced yet" from "absent".
    pub fn lookup(&self, id: &str) -> Lookup {
        match self.get(id) {
            Some(game) => Lookup::Found(game.clone()),
            None if self.complete => Lookup::Absent,
            None => Lookup::Pending,
        }
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            items: self.items.clone(),
            cursor: self.cursor,
            complete: self.complete,
            failed: self.failed,
            error: self.last_error.clone(),
        }
    }

    pub fn status(&self) -> CatalogStatus {
        CatalogStatus {
            total: self.items.len(),
            cursor: self.cursor,
            complete: self.complete,
            failed: self.failed,
            error: self.last_error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use std::collections::HashSet;

    #[test]
    fn test_new_store() {
        let store = CatalogStore::new();
        assert!(store.is_empty());
        assert_eq!(store.cursor(), 1);
        assert!(!store.is_complete());
        assert!(!store.is_failed());
    }

    #[test]
    fn test_merge_preserves_first_seen_order() {
        let mut store = CatalogStore::new();
        let added = store.merge(vec![
            fixtures::game("b", "puzzle"),
            fixtures::game("a", "action"),
        ]);
        assert_eq!(added, 2);

        let added = store.merge(vec![
            fixtures::game("c", "puzzle"),
            fixtures::game("a", "action"),
        ]);
        assert_eq!(added, 1);

        let ids: Vec<&str> = store.items().iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_merge_drops_later_duplicates() {
        let mut store = CatalogStore::new();
        let mut original = fixtures::game("a", "action");
        original.title = "First".to_string();
        store.merge(vec![original]);

        let mut duplicate = fixtures::game("a", "puzzle");
        duplicate.title = "Second".to_string();
        assert_eq!(store.merge(vec![duplicate]), 0);

        let game = store.get("a").unwrap();
        assert_eq!(game.title, "First");
        assert_eq!(game.category, "action");
    }

    #[test]
    fn test_merge_duplicates_within_one_page() {
        let mut store = CatalogStore::new();
        let added = store.merge(vec![
            fixtures::game("a", "action"),
            fixtures::game("a", "action"),
            fixtures::game("b", "action"),
        ]);
        assert_eq!(added, 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_merge_empty_is_noop() {
        let mut store = CatalogStore::new();
        assert_eq!(store.merge(vec![]), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_overlapping_pages_keep_ids_unique() {
        let mut store = CatalogStore::new();
        // Windows of 10 IDs sliding by 4, replayed twice.
        for _ in 0..2 {
            for start in (0..60).step_by(4) {
                store.merge(fixtures::games(start..start + 10, "arcade"));
            }
        }

        let unique: HashSet<&str> = store.items().iter().map(|g| g.id.as_str()).collect();
        assert_eq!(unique.len(), store.len());
        assert_eq!(store.len(), 66);
    }

    #[test]
    fn test_advance_cursor() {
        let mut store = CatalogStore::new();
        assert_eq!(store.advance_cursor(), 2);
        assert_eq!(store.advance_cursor(), 3);
        assert_eq!(store.cursor(), 3);
    }

    #[test]
    fn test_mark_complete_idempotent() {
        let mut store = CatalogStore::new();
        store.mark_complete();
        store.mark_complete();
        assert!(store.is_complete());
        assert!(store.is_terminal());
    }

    #[test]
    fn test_mark_failed_keeps_items() {
        let mut store = CatalogStore::new();
        store.merge(fixtures::games(0..5, "puzzle"));
        store.mark_failed("connection reset");
        store.mark_failed("connection reset");

        assert!(store.is_failed());
        assert_eq!(store.len(), 5);
        assert_eq!(store.last_error(), Some("connection reset"));
    }

    #[test]
    fn test_failed_and_complete_are_exclusive() {
        let mut store = CatalogStore::new();
        store.mark_complete();
        store.mark_failed("late error");
        assert!(store.is_complete());
        assert!(!store.is_failed());

        let mut store = CatalogStore::new();
        store.mark_failed("error");
        store.mark_complete();
        assert!(store.is_failed());
        assert!(!store.is_complete());
    }

    #[test]
    fn test_reset_clears_only_failure() {
        let mut store = CatalogStore::new();
        store.merge(fixtures::games(0..3, "puzzle"));
        store.advance_cursor();
        store.mark_failed("timeout");

        store.reset();

        assert!(!store.is_failed());
        assert!(store.last_error().is_none());
        assert_eq!(store.len(), 3);
        assert_eq!(store.cursor(), 2);
        assert!(!store.is_complete());
    }

    #[test]
    fn test_lookup_states() {
        let mut store = CatalogStore::new();
        store.merge(vec![fixtures::game("a", "action")]);

        assert!(matches!(store.lookup("a"), Lookup::Found(g) if g.id == "a"));
        assert_eq!(store.lookup("zzz"), Lookup::Pending);

        store.mark_complete();
        assert_eq!(store.lookup("zzz"), Lookup::Absent);
    }

    #[test]
    fn test_snapshot_and_status() {
        let mut store = CatalogStore::new();
        store.merge(fixtures::games(0..4, "puzzle"));
        store.advance_cursor();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.items.len(), 4);
        assert_eq!(snapshot.cursor, 2);
        assert!(!snapshot.complete);

        let status = store.status();
        assert_eq!(status.total, 4);
        assert_eq!(status.cursor, 2);
        assert!(status.error.is_none());
    }
}
