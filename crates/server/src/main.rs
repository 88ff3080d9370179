use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gamehub_core::{
    load_config, load_config_from_env, validate_config, CatalogEngine, Config, ConfigError,
    FeedClient, GamePixClient,
};
use gamehub_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("GameHub v{}", VERSION);

    // Determine config path
    let config_path = std::env::var("GAMEHUB_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    let config = load(&config_path)?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Feed: {}", config.feed.base_url);
    info!(
        "Sync: page_size={}, auto_continue={}",
        config.sync.page_size, config.sync.auto_continue
    );

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!("Config hash: {}", &config_hash[..16]);

    // Create feed client
    let feed: Arc<dyn FeedClient> = Arc::new(
        GamePixClient::new(config.feed.clone()).context("Failed to create feed client")?,
    );
    info!("Using feed: {}", feed.name());

    // Create catalog engine
    let engine = Arc::new(CatalogEngine::new(config.engine_config(), feed));

    if config.sync.start_on_boot {
        match engine.start().await {
            Some(_) => info!("Catalog sync started"),
            None => info!("Catalog sync not started (already complete)"),
        }
    } else {
        info!("Sync on boot disabled, pages load on request");
    }

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), Arc::clone(&engine)));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    engine.shutdown().await;
    info!("Catalog sync stopped");

    Ok(())
}

/// Load the config file, falling back to defaults plus environment when it
/// does not exist.
fn load(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from {:?}", config_path);
    match load_config(config_path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(path)) => {
            warn!(
                "Config file {} not found, using defaults and environment",
                path
            );
            load_config_from_env().context("Failed to load config from environment")
        }
        Err(e) => {
            Err(e).with_context(|| format!("Failed to load config from {:?}", config_path))
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
