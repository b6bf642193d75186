use std::sync::Arc;

use crate::config::Config;
use crate::embedding::backfill::EmbeddingBackfill;
use crate::generation::generator::CvGenerator;
use crate::matching::engine::MatchEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub matcher: Arc<MatchEngine>,
    pub generator: Arc<CvGenerator>,
    pub backfill: Arc<EmbeddingBackfill>,
}
