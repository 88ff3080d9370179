//! View configuration.

use serde::{Deserialize, Serialize};

/// Settings for the derived catalog views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Categories listed first, in this order. Anything else follows alphabetically.
    #[serde(default = "default_preferred_categories")]
    pub preferred_categories: Vec<String>,

    /// How many games a detail view recommends.
    #[serde(default = "default_recommendations")]
    pub recommendations: usize,

    /// Page size used when a caller gives no limit.
    #[serde(default = "default_page_limit")]
    pub default_page_limit: usize,
}

fn default_preferred_categories() -> Vec<String> {
    [
        "action",
        "adventure",
        "arcade",
        "puzzle",
        "racing",
        "sports",
        "strategy",
        "casual",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_recommendations() -> usize {
    10
}

fn default_page_limit() -> usize {
    48
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            preferred_categories: default_preferred_categories(),
            recommendations: default_recommendations(),
            default_page_limit: default_page_limit(),
        }
    }
}
