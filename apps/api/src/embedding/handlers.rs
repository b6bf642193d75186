//! Axum route handlers for the embedding API.

use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::embedding::backfill::BatchReport;
use crate::errors::{ApiError, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BackfillRequest {
    pub user_id: Uuid,
}

/// POST /api/v1/embeddings/backfill
///
/// Embeds one batch of the user's components that have no embedding yet.
/// Per-component failures are reported in the body, not as an error status.
pub async fn handle_backfill(
    State(state): State<AppState>,
    Json(request): Json<BackfillRequest>,
) -> Result<Json<BatchReport>, ApiError> {
    if request.user_id.is_nil() {
        return Err(AppError::Validation("user_id is required".to_string())
            .for_env(state.config.environment));
    }

    let report = state
        .backfill
        .backfill_owner(request.user_id)
        .await
        .map_err(|e| e.for_env(state.config.environment))?;

    Ok(Json(report))
}
