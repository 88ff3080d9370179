//! Catalog sync API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use gamehub_core::{EngineStatus, Launch, StepOutcome};
use serde::Serialize;
use tracing::info;

use super::handlers::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct RetryResponse {
    pub message: String,
    /// Page the sync resumes from.
    pub cursor: u32,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/catalog
///
/// Catalog counters plus sync and search status.
pub async fn get_catalog(State(state): State<Arc<AppState>>) -> Json<EngineStatus> {
    Json(state.engine().status().await)
}

/// POST /api/v1/catalog/retry
///
/// Clear a sync failure and resume from the failed page.
pub async fn retry(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let engine = state.engine();
    let cursor = engine.catalog_status().await.cursor;

    match engine.retry().await {
        Some(Launch::ShutDown) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("Catalog sync is shut down")),
        )
            .into_response(),
        Some(Launch::Started(_) | Launch::Continuing) => {
            info!("Catalog sync retry requested, resuming at page {}", cursor);
            (
                StatusCode::ACCEPTED,
                Json(RetryResponse {
                    message: format!("Resuming sync at page {}", cursor),
                    cursor,
                }),
            )
                .into_response()
        }
        None => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::new("Catalog sync has not failed")),
        )
            .into_response(),
    }
}

/// POST /api/v1/catalog/load-more
///
/// Fetch one more page now. Reports `busy` if a fetch is already in flight.
pub async fn load_more(State(state): State<Arc<AppState>>) -> Json<StepOutcome> {
    Json(state.engine().load_more().await)
}
