//! Read-only derivations over the catalog.
//!
//! Everything here is a pure function of its inputs, except [`search`] which
//! delegates to the feed's remote search.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::feed::{FeedClient, FeedError, Game};

/// Games sharing one category, as shown in a grouped listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryGroup {
    pub category: String,
    /// Display label, see [`category_label`].
    pub label: String,
    pub games: Vec<Game>,
}

/// A window over a longer sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub offset: usize,
    pub limit: usize,
    /// Length of the whole sequence.
    pub total: usize,
    /// More items exist past this window.
    pub has_more: bool,
}

impl<T: Clone> Paged<T> {
    /// Cut the `offset..offset + limit` window out of `all`.
    pub fn from_slice(all: &[T], offset: usize, limit: usize) -> Self {
        let items = paginate(all, offset, limit).to_vec();
        let end = offset.saturating_add(items.len());
        Self {
            items,
            offset,
            limit,
            total: all.len(),
            has_more: end < all.len(),
        }
    }
}

/// Which fields, besides the title, a local filter matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFields {
    pub category: bool,
    pub description: bool,
}

impl Default for MatchFields {
    fn default() -> Self {
        Self {
            category: true,
            description: true,
        }
    }
}

impl MatchFields {
    pub fn title_only() -> Self {
        Self {
            category: false,
            description: false,
        }
    }
}

/// Distinct categories in `items`.
///
/// Categories named in `preferred` come first, in that order; the rest follow
/// alphabetically. Games without a category are not listed under any.
pub fn categories(items: &[Game], preferred: &[String]) -> Vec<String> {
    let mut present: BTreeSet<&str> = items
        .iter()
        .map(|g| g.category.as_str())
        .filter(|c| !c.is_empty())
        .collect();

    let mut ordered = Vec::with_capacity(present.len());
    for category in preferred {
        if present.remove(category.as_str()) {
            ordered.push(category.clone());
        }
    }
    ordered.extend(present.into_iter().map(str::to_string));
    ordered
}

/// Games whose category equals `category`, in catalog order.
pub fn by_category(items: &[Game], category: &str) -> Vec<Game> {
    items
        .iter()
        .filter(|g| g.category == category)
        .cloned()
        .collect()
}

/// Group games by category, groups ordered as [`categories`] orders them.
pub fn group_by_category(items: &[Game], preferred: &[String]) -> Vec<CategoryGroup> {
    let mut buckets: HashMap<&str, Vec<Game>> = HashMap::new();
    for game in items.iter().filter(|g| !g.category.is_empty()) {
        buckets
            .entry(game.category.as_str())
            .or_default()
            .push(game.clone());
    }

    categories(items, preferred)
        .into_iter()
        .map(|category| {
            let games = buckets.remove(category.as_str()).unwrap_or_default();
            CategoryGroup {
                label: category_label(&category),
                category,
                games,
            }
        })
        .collect()
}

/// Display label for a category: first character upper-cased.
pub fn category_label(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The `offset..offset + limit` window of `items`, clamped to its bounds.
pub fn paginate<T>(items: &[T], offset: usize, limit: usize) -> &[T] {
    let start = offset.min(items.len());
    let end = start.saturating_add(limit).min(items.len());
    &items[start..end]
}

/// Case-insensitive substring filter over locally synced games.
///
/// A blank query matches everything.
pub fn filter_local(items: &[Game], query: &str, fields: MatchFields) -> Vec<Game> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.to_vec();
    }

    items
        .iter()
        .filter(|g| {
            g.title.to_lowercase().contains(&needle)
                || (fields.category && g.category.to_lowercase().contains(&needle))
                || (fields.description && g.description.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Up to `limit` games other than `exclude_id`, in catalog order.
pub fn recommendations(items: &[Game], exclude_id: &str, limit: usize) -> Vec<Game> {
    items
        .iter()
        .filter(|g| g.id != exclude_id)
        .take(limit)
        .cloned()
        .collect()
}

/// Remote search. A blank query returns no games without calling the feed;
/// callers treat that as "no filter".
pub async fn search(feed: &dyn FeedClient, query: &str) -> Result<Vec<Game>, FeedError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    feed.search_items(query).await
}
