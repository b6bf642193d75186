//! Relevance retriever: embed the job description, search, fall back to the full list.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::embedding::EmbeddingProvider;
use crate::errors::AppError;
use crate::models::component::RankedComponent;
use crate::store::ComponentStore;

#[derive(Clone)]
pub struct RelevanceRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn ComponentStore>,
}

impl RelevanceRetriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn ComponentStore>) -> Self {
        Self { embedder, store }
    }

    /// Candidate components for a job description, most relevant first.
    ///
    /// A blank job description or an empty search result falls back to the
    /// owner's full list (truncated to `limit`) with no similarity attached.
    /// The blank case never calls the embedding provider.
    pub async fn find_relevant_components(
        &self,
        owner_id: Uuid,
        job_description: &str,
        limit: usize,
    ) -> Result<Vec<RankedComponent>, AppError> {
        if limit == 0 {
            return Err(AppError::Validation(
                "limit must be greater than zero".to_string(),
            ));
        }

        if job_description.trim().is_empty() {
            debug!("Blank job description for user {owner_id}; using full component list");
            return self.fallback(owner_id, limit).await;
        }

        let query = self.embedder.embed(job_description).await?;
        let ranked = self.store.similarity_search(owner_id, &query, limit).await?;

        if ranked.is_empty() {
            info!("Similarity search empty for user {owner_id}; falling back to full list");
            return self.fallback(owner_id, limit).await;
        }

        debug!("Retrieved {} candidates for user {owner_id}", ranked.len());
        Ok(ranked)
    }

    async fn fallback(&self, owner_id: Uuid, limit: usize) -> Result<Vec<RankedComponent>, AppError> {
        let mut components = self.store.list_for_owner(owner_id).await?;
        components.truncate(limit);
        Ok(components.into_iter().map(RankedComponent::unranked).collect())
    }
}
