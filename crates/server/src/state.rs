use gamehub_core::{CatalogEngine, Config, SanitizedConfig};
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    config: Config,
    engine: Arc<CatalogEngine>,
}

impl AppState {
    pub fn new(config: Config, engine: Arc<CatalogEngine>) -> Self {
        Self { config, engine }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn engine(&self) -> &CatalogEngine {
        self.engine.as_ref()
    }

    /// Page size used when a request gives no limit.
    pub fn default_page_limit(&self) -> usize {
        self.config.views.default_page_limit
    }
}
