//! Search API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use gamehub_core::SearchState;
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetQueryRequest {
    #[serde(default)]
    pub query: String,
}

/// GET /api/v1/search
///
/// Current query and the results applied for it.
pub async fn get_search(State(state): State<Arc<AppState>>) -> Json<SearchState> {
    Json(state.engine().search_state().await)
}

/// PUT /api/v1/search
///
/// Replace the query. The remote search runs after the debounce delay; an
/// empty query clears the filter.
pub async fn set_query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SetQueryRequest>,
) -> (StatusCode, Json<SearchState>) {
    let engine = state.engine();
    let scheduled = engine.set_query(request.query).await.is_some();

    let status = if scheduled {
        StatusCode::ACCEPTED
    } else {
        StatusCode::OK
    };
    (status, Json(engine.search_state().await))
}
