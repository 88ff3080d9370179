pub mod catalog;
pub mod config;
pub mod engine;
pub mod feed;
pub mod metrics;
pub mod search;
pub mod sync;
pub mod testing;
pub mod view;

pub use catalog::{
    CatalogEvent, CatalogSnapshot, CatalogStatus, CatalogStore, ChangeNotifier, Lookup,
    Subscription,
};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config, ConfigError,
    SanitizedConfig, ServerConfig,
};
pub use engine::{
    BrowseSource, BrowseView, CatalogEngine, CategorySummary, EngineConfig, EngineStatus,
    LookupError,
};
pub use feed::{FeedClient, FeedError, FeedPage, Game, GamePixClient, GamePixConfig};
pub use search::{SearchConfig, SearchCoordinator, SearchState};
pub use sync::{Launch, StepOutcome, SyncConfig, SyncDriver, SyncPhase, SyncStatus};
pub use view::{CategoryGroup, MatchFields, Paged, ViewConfig};
