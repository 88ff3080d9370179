use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{catalog, games, handlers, middleware::metrics_middleware, search, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Catalog sync
        .route("/catalog", get(catalog::get_catalog))
        .route("/catalog/retry", post(catalog::retry))
        .route("/catalog/load-more", post(catalog::load_more))
        // Games
        .route("/games", get(games::list_games))
        .route("/games/{id}", get(games::get_game))
        .route(
            "/games/{id}/recommendations",
            get(games::get_recommendations),
        )
        // Categories
        .route("/categories", get(games::list_categories))
        .route("/categories/{category}/games", get(games::category_games))
        // Search
        .route("/search", get(search::get_search).put(search::set_query))
        // WebSocket for real-time updates
        .route("/ws", get(ws::ws_handler))
        .with_state(state.clone());

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
