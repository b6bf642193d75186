//! Axum route handlers for the Match API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::matching::engine::MatchResult;
use crate::models::component::RankedComponent;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MatchScoreRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct RelevantComponentsRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub job_description: String,
    /// Defaults to the configured candidate limit.
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RelevantComponentsResponse {
    pub components: Vec<RankedComponent>,
}

/// POST /api/v1/match/score
///
/// Scores the user's components against a job description. Repeated calls within
/// the cache TTL return the cached result with `metadata.cached = true`.
pub async fn handle_match_score(
    State(state): State<AppState>,
    Json(request): Json<MatchScoreRequest>,
) -> Result<Json<MatchResult>, ApiError> {
    let result = state
        .matcher
        .score(request.user_id, &request.job_description)
        .await
        .map_err(|e| e.for_env(state.config.environment))?;

    Ok(Json(result))
}

/// POST /api/v1/match/components
///
/// Returns the candidate components for a job description, most relevant first.
pub async fn handle_relevant_components(
    State(state): State<AppState>,
    Json(request): Json<RelevantComponentsRequest>,
) -> Result<Json<RelevantComponentsResponse>, ApiError> {
    let limit = request.limit.unwrap_or(state.config.candidate_limit);
    let components = state
        .matcher
        .relevant_components(request.user_id, &request.job_description, limit)
        .await
        .map_err(|e| e.for_env(state.config.environment))?;

    Ok(Json(RelevantComponentsResponse { components }))
}
