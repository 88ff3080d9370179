//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::search::SearchConfig;
use crate::sync::SyncConfig;
use crate::view::ViewConfig;

/// Everything the catalog engine needs besides a feed client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub views: ViewConfig,
    /// Capacity of the change event channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_event_capacity() -> usize {
    256
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sync: SyncConfig::default(),
            search: SearchConfig::default(),
            views: ViewConfig::default(),
            event_capacity: default_event_capacity(),
        }
    }
}
