pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::embedding::handlers as embedding;
use crate::generation::handlers as generation;
use crate::matching::handlers as matching;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Match API
        .route("/api/v1/match/score", post(matching::handle_match_score))
        .route(
            "/api/v1/match/components",
            post(matching::handle_relevant_components),
        )
        // CV API
        .route("/api/v1/cv/select", post(generation::handle_select_content))
        .route("/api/v1/cv/generate", post(generation::handle_generate_cv))
        .route(
            "/api/v1/cv/variants",
            post(generation::handle_generate_variants),
        )
        // Embedding API
        .route(
            "/api/v1/embeddings/backfill",
            post(embedding::handle_backfill),
        )
        .with_state(state)
}
