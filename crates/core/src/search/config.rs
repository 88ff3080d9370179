//! Search configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the debounced remote search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period after the last query change before a search is issued.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        assert_eq!(SearchConfig::default().debounce_ms, 300);
        let config: SearchConfig = toml::from_str("debounce_ms = 0").unwrap();
        assert_eq!(config.debounce_ms, 0);
    }
}
