//! Embedding backfill: embeds an owner's components that have no vector yet.
//!
//! One bad component never blocks the rest of the batch. Every per-item failure
//! is recorded in the `BatchReport` and the loop moves on.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::embedding::EmbeddingProvider;
use crate::errors::AppError;
use crate::store::{ComponentStore, PendingComponent};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItemError {
    pub component_id: Uuid,
    pub message: String,
}

/// Outcome of one backfill batch. `successful + failed == total`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<BatchItemError>,
}

impl BatchReport {
    pub fn is_partial_failure(&self) -> bool {
        !self.errors.is_empty()
    }

    fn record_failure(&mut self, component_id: Uuid, message: String) {
        self.failed += 1;
        self.errors.push(BatchItemError {
            component_id,
            message,
        });
    }
}

#[derive(Clone)]
pub struct EmbeddingBackfill {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn ComponentStore>,
    batch_size: usize,
}

impl EmbeddingBackfill {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn ComponentStore>,
        batch_size: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            batch_size: batch_size.max(1),
        }
    }

    /// Embeds up to `batch_size` of the owner's components that lack an embedding.
    ///
    /// Only the initial lookup can fail the call as a whole. Rows that cannot be
    /// decoded are reported per item like any other failure.
    pub async fn backfill_owner(&self, owner_id: Uuid) -> Result<BatchReport, AppError> {
        let pending = self
            .store
            .missing_embeddings(owner_id, self.batch_size)
            .await?;

        let report = self.embed_components(owner_id, &pending).await;

        if report.is_partial_failure() {
            warn!(
                "Backfill for user {owner_id}: {}/{} components failed",
                report.failed, report.total
            );
        } else {
            info!(
                "Backfill for user {owner_id}: embedded {} components",
                report.successful
            );
        }
        Ok(report)
    }

    async fn embed_components(&self, owner_id: Uuid, pending: &[PendingComponent]) -> BatchReport {
        let mut report = BatchReport {
            total: pending.len(),
            ..BatchReport::default()
        };

        for entry in pending {
            let component = match entry {
                Ok(component) => component,
                Err(bad) => {
                    report.record_failure(bad.component_id, bad.error.to_string());
                    continue;
                }
            };

            let text = component.embedding_text();
            if text.trim().is_empty() {
                report.record_failure(component.id, "component has no embeddable text".to_string());
                continue;
            }

            let vector = match self.embedder.embed(&text).await {
                Ok(vector) => vector,
                Err(e) => {
                    report.record_failure(component.id, e.to_string());
                    continue;
                }
            };

            match self
                .store
                .store_embedding(owner_id, component.id, &vector)
                .await
            {
                Ok(()) => report.successful += 1,
                Err(e) => report.record_failure(component.id, e.to_string()),
            }
        }

        report
    }
}
