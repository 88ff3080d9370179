//! Game browsing API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use gamehub_core::{BrowseView, CategorySummary, Game, LookupError, Paged};
use serde::{Deserialize, Serialize};

use super::handlers::ErrorResponse;
use crate::state::AppState;

/// Upper bound on `limit` for any paged listing.
const MAX_PAGE_LIMIT: usize = 500;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl PageParams {
    fn limit(&self, state: &AppState) -> usize {
        self.limit
            .unwrap_or_else(|| state.default_page_limit())
            .min(MAX_PAGE_LIMIT)
    }
}

/// 404 body for a game lookup.
#[derive(Debug, Serialize)]
pub struct GameNotFoundResponse {
    pub error: String,
    /// The catalog is fully synced, so the game definitely does not exist.
    pub complete: bool,
}

#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    pub categories: Vec<CategorySummary>,
    pub complete: bool,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub id: String,
    pub games: Vec<Game>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/games
///
/// Browse view: the whole catalog, or the current search when a query is set.
pub async fn list_games(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Json<BrowseView> {
    let limit = params.limit(&state);
    Json(state.engine().browse(params.offset, Some(limit)).await)
}

/// GET /api/v1/games/{id}
///
/// Get a single game. Falls back to the feed while the catalog is syncing.
pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Game>, impl IntoResponse> {
    let engine = state.engine();

    match engine.game(&id).await {
        Ok(game) => Ok(Json(game)),
        Err(LookupError::NotFound(_)) => Err((
            StatusCode::NOT_FOUND,
            Json(GameNotFoundResponse {
                error: format!("Game not found: {}", id),
                complete: true,
            }),
        )
            .into_response()),
        Err(LookupError::NotYetSynced(_)) => Err((
            StatusCode::NOT_FOUND,
            Json(GameNotFoundResponse {
                error: format!("Game not synced yet: {}", id),
                complete: false,
            }),
        )
            .into_response()),
        Err(e @ LookupError::Feed(_)) => Err((
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse::new(e.to_string())),
        )
            .into_response()),
    }
}

/// GET /api/v1/games/{id}/recommendations
///
/// Other games to show next to `id`.
pub async fn get_recommendations(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<RecommendationsResponse> {
    let games = state.engine().recommendations(&id).await;
    Json(RecommendationsResponse { id, games })
}

/// GET /api/v1/categories
///
/// Categories present in the catalog, preferred ones first.
pub async fn list_categories(State(state): State<Arc<AppState>>) -> Json<CategoryListResponse> {
    let engine = state.engine();
    let categories = engine.category_summaries().await;
    let complete = engine.catalog_status().await.complete;
    Json(CategoryListResponse {
        categories,
        complete,
    })
}

/// GET /api/v1/categories/{category}/games
///
/// One page of the games in a category.
pub async fn category_games(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(params): Query<PageParams>,
) -> Json<Paged<Game>> {
    let limit = params.limit(&state);
    Json(
        state
            .engine()
            .games_in_category(&category, params.offset, Some(limit))
            .await,
    )
}
