//! Axum route handlers for the CV generation API.

use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::generation::focus::FocusArea;
use crate::generation::generator::{GeneratedCv, GeneratedVariants};
use crate::generation::selector::CvContent;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateCvRequest {
    pub user_id: Uuid,
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateVariantsRequest {
    pub user_id: Uuid,
    pub job_description: String,
    /// Defaults to every focus area.
    pub focus_areas: Option<Vec<FocusArea>>,
}

/// POST /api/v1/cv/select
///
/// Selected and ranked components for a job description, before any document
/// is built.
pub async fn handle_select_content(
    State(state): State<AppState>,
    Json(request): Json<GenerateCvRequest>,
) -> Result<Json<CvContent>, ApiError> {
    let content = state
        .generator
        .select_content(request.user_id, &request.job_description)
        .await
        .map_err(|e| e.for_env(state.config.environment))?;

    Ok(Json(content))
}

/// POST /api/v1/cv/generate
///
/// Selects the user's components for a job description and returns the document
/// the renderer consumes.
pub async fn handle_generate_cv(
    State(state): State<AppState>,
    Json(request): Json<GenerateCvRequest>,
) -> Result<Json<GeneratedCv>, ApiError> {
    let cv = state
        .generator
        .generate_cv(request.user_id, &request.job_description)
        .await
        .map_err(|e| e.for_env(state.config.environment))?;

    Ok(Json(cv))
}

/// POST /api/v1/cv/variants
///
/// One scored CV variant per focus area, plus which one to use.
pub async fn handle_generate_variants(
    State(state): State<AppState>,
    Json(request): Json<GenerateVariantsRequest>,
) -> Result<Json<GeneratedVariants>, ApiError> {
    let focus_areas = request
        .focus_areas
        .unwrap_or_else(|| FocusArea::ALL.to_vec());

    let generated = state
        .generator
        .generate_variants(request.user_id, &request.job_description, &focus_areas)
        .await
        .map_err(|e| e.for_env(state.config.environment))?;

    Ok(Json(generated))
}
