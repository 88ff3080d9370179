//! Sync driver configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the catalog sync driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Games requested per feed page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Keep fetching pages until the feed is exhausted.
    /// When disabled, each start or load-more fetches a single page.
    #[serde(default = "default_auto_continue")]
    pub auto_continue: bool,

    /// Pause between consecutive pages (milliseconds).
    #[serde(default)]
    pub page_delay_ms: u64,

    /// Start syncing as soon as the engine is created by the server.
    #[serde(default = "default_start_on_boot")]
    pub start_on_boot: bool,
}

fn default_page_size() -> u32 {
    96
}

fn default_auto_continue() -> bool {
    true
}

fn default_start_on_boot() -> bool {
    true
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            auto_continue: default_auto_continue(),
            page_delay_ms: 0,
            start_on_boot: default_start_on_boot(),
        }
    }
}
