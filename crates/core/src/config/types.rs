use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::engine::EngineConfig;
use crate::feed::GamePixConfig;
use crate::search::SearchConfig;
use crate::sync::SyncConfig;
use crate::view::ViewConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub feed: GamePixConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub views: ViewConfig,
}

impl Config {
    /// The parts of the configuration the catalog engine consumes.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            sync: self.sync.clone(),
            search: self.search.clone(),
            views: self.views.clone(),
            ..Default::default()
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Sanitized config for API responses (publisher ID redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub feed: SanitizedFeedConfig,
    pub sync: SyncConfig,
    pub search: SearchConfig,
    pub views: ViewConfig,
}

/// Sanitized feed config (sid hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedFeedConfig {
    pub base_url: String,
    pub sid_configured: bool,
    pub timeout_secs: u64,
    pub search_limit: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            feed: SanitizedFeedConfig {
                base_url: config.feed.base_url.clone(),
                sid_configured: !config.feed.sid.is_empty(),
                timeout_secs: config.feed.timeout_secs,
                search_limit: config.feed.search_limit,
            },
            sync: config.sync.clone(),
            search: config.search.clone(),
            views: config.views.clone(),
        }
    }
}
