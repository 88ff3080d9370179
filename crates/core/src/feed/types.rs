//! Types for the remote game feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A game listed by the feed.
///
/// Identity is the `id` field. Every other field is optional on the wire and
/// falls back to an empty/zero value when the feed omits it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Game {
    /// Unique game identifier.
    pub id: String,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Publisher namespace tag.
    #[serde(default)]
    pub namespace: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Category tag (e.g. "puzzle").
    #[serde(default)]
    pub category: String,
    /// Preferred screen orientation.
    #[serde(default)]
    pub orientation: String,
    /// Quality score in [0, 1].
    #[serde(default)]
    pub quality_score: f64,
    /// Native width in pixels.
    #[serde(default)]
    pub width: u32,
    /// Native height in pixels.
    #[serde(default)]
    pub height: u32,
    /// Last modification timestamp (RFC 3339).
    #[serde(default)]
    pub date_modified: String,
    /// Publication timestamp (RFC 3339).
    #[serde(default)]
    pub date_published: String,
    /// Banner image URL.
    #[serde(default)]
    pub banner_image: String,
    /// Square thumbnail URL.
    #[serde(default)]
    pub image: String,
    /// URL of the playable page.
    #[serde(default)]
    pub url: String,
}

impl Game {
    /// Publication time, if the feed provided a parseable timestamp.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.date_published)
    }

    /// Modification time, if the feed provided a parseable timestamp.
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.date_modified)
    }

    /// Whether the game has a banner image to show.
    pub fn has_banner(&self) -> bool {
        !self.banner_image.trim().is_empty()
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// One page of the feed listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FeedPage {
    /// Games on this page, in feed order.
    pub items: Vec<Game>,
    /// Token (URL) of the next page, `None` when this is the last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<String>,
}

impl FeedPage {
    /// Create a page.
    pub fn new(items: Vec<Game>, next_page: Option<String>) -> Self {
        Self { items, next_page }
    }

    /// Whether the feed advertised a further page.
    pub fn has_next(&self) -> bool {
        self.next_page.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{"id": "g-1", "title": "Snake"}"#;
        let game: Game = serde_json::from_str(json).unwrap();

        assert_eq!(game.id, "g-1");
        assert_eq!(game.title, "Snake");
        assert_eq!(game.description, "");
        assert_eq!(game.category, "");
        assert_eq!(game.quality_score, 0.0);
        assert!(!game.has_banner());
    }

    #[test]
    fn test_published_at_parses_rfc3339() {
        let game = Game {
            id: "g-1".to_string(),
            date_published: "2024-03-01T10:00:00Z".to_string(),
            date_modified: "2024-03-02T12:30:00+02:00".to_string(),
            ..Default::default()
        };

        let published = game.published_at().unwrap();
        assert_eq!(published.to_rfc3339(), "2024-03-01T10:00:00+00:00");
        let modified = game.modified_at().unwrap();
        assert_eq!(modified.to_rfc3339(), "2024-03-02T10:30:00+00:00");
    }

    #[test]
    fn test_malformed_timestamp_is_none() {
        let game = Game {
            id: "g-1".to_string(),
            date_published: "yesterday".to_string(),
            ..Default::default()
        };

        assert!(game.published_at().is_none());
        assert!(game.modified_at().is_none());
    }

    #[test]
    fn test_feed_page_has_next() {
        assert!(FeedPage::new(vec![], Some("https://next".to_string())).has_next());
        assert!(!FeedPage::new(vec![], None).has_next());
    }
}
