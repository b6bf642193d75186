//! CV Generation: retrieve → select → build the renderer document.
//!
//! Flow: find_relevant_components ‖ get_profile → select (per focus) → build_document.
//! Component text is never edited here; the document only carries what the
//! selector kept and bounded.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::document::{build_document, CvDocument};
use crate::generation::focus::FocusArea;
use crate::generation::selector::{ComponentSelector, CvContent, SelectionInsights};
use crate::generation::variants::{CvVariant, VariantGenerator, VariantRecommendation};
use crate::matching::retriever::RelevanceRetriever;
use crate::models::component::{Component, RankedComponent};
use crate::models::profile::Profile;
use crate::store::ProfileStore;

/// A single CV ready for the renderer.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedCv {
    pub document: CvDocument,
    pub insights: SelectionInsights,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedVariants {
    pub variants: Vec<CvVariant>,
    pub recommendation: VariantRecommendation,
}

pub struct CvGenerator {
    retriever: RelevanceRetriever,
    profiles: Arc<dyn ProfileStore>,
    selector: ComponentSelector,
    variants: VariantGenerator,
    candidate_limit: usize,
}

impl CvGenerator {
    pub fn new(
        retriever: RelevanceRetriever,
        profiles: Arc<dyn ProfileStore>,
        selector: ComponentSelector,
        variants: VariantGenerator,
        candidate_limit: usize,
    ) -> Self {
        Self {
            retriever,
            profiles,
            selector,
            variants,
            candidate_limit,
        }
    }

    /// Selected and ranked content only, without the document wrapper.
    pub async fn select_content(
        &self,
        owner_id: Uuid,
        job_description: &str,
    ) -> Result<CvContent, AppError> {
        let (candidates, profile) = self.load(owner_id, job_description).await?;
        let components: Vec<Component> = candidates.into_iter().map(|r| r.component).collect();
        self.selector
            .select_and_rank_components(&components, job_description, &profile)
            .await
    }

    /// Balanced CV for one job description.
    pub async fn generate_cv(
        &self,
        owner_id: Uuid,
        job_description: &str,
    ) -> Result<GeneratedCv, AppError> {
        let (candidates, profile) = self.load(owner_id, job_description).await?;
        let components: Vec<Component> = candidates.into_iter().map(|r| r.component).collect();

        let selection = self
            .selector
            .select(&components, job_description, &profile, FocusArea::Balanced)
            .await?;

        let mut document = build_document(&profile, selection.content);
        if document.profile.summary.is_none() && !selection.insights.professional_summary.is_empty() {
            document.profile.summary = Some(selection.insights.professional_summary.clone());
        }

        info!(
            "Generated CV for user {owner_id}: {} experiences, {} projects",
            document.experience.len(),
            document.projects.len()
        );

        Ok(GeneratedCv {
            document,
            insights: selection.insights,
        })
    }

    /// One variant per focus area plus a recommendation across them.
    pub async fn generate_variants(
        &self,
        owner_id: Uuid,
        job_description: &str,
        focus_areas: &[FocusArea],
    ) -> Result<GeneratedVariants, AppError> {
        if focus_areas.is_empty() {
            return Err(AppError::Validation(
                "at least one focus area is required".to_string(),
            ));
        }

        let (candidates, profile) = self.load(owner_id, job_description).await?;
        let variants = self
            .variants
            .generate_variants(&candidates, job_description, &profile, focus_areas)
            .await?;
        let recommendation = self.variants.recommend(&variants)?;

        info!(
            "Generated {} variants for user {owner_id}; recommending {}",
            variants.len(),
            recommendation.recommended_focus
        );

        Ok(GeneratedVariants {
            variants,
            recommendation,
        })
    }

    async fn load(
        &self,
        owner_id: Uuid,
        job_description: &str,
    ) -> Result<(Vec<RankedComponent>, Profile), AppError> {
        if owner_id.is_nil() {
            return Err(AppError::Validation("user_id is required".to_string()));
        }
        if job_description.trim().is_empty() {
            return Err(AppError::Validation(
                "job_description cannot be empty".to_string(),
            ));
        }

        let (candidates, profile) = tokio::try_join!(
            self.retriever
                .find_relevant_components(owner_id, job_description, self.candidate_limit),
            self.profiles.get_profile(owner_id),
        )?;

        if candidates.is_empty() {
            return Err(AppError::NotFound(format!(
                "No CV components found for user {owner_id}"
            )));
        }

        Ok((candidates, profile))
    }
}
