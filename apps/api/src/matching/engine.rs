//! Match engine: retrieve → score → diagnose, behind a TTL cache.
//!
//! Order per request: cache lookup, in-flight guard, cache re-check, compute, put.
//! No external call happens for a key whose result is cached.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::cache::{cache_key, InflightRequests, ResultCache};
use crate::matching::jd_parser::JdParser;
use crate::matching::missing_skills::detect_missing_skills;
use crate::matching::retriever::RelevanceRetriever;
use crate::matching::scoring::{score_categories, ScoreBreakdown, ScoringConfig};
use crate::matching::suggestions::generate_suggestions;
use crate::models::component::{Category, Component, RankedComponent};
use crate::store::ComponentStore;

const TOP_MATCHES: usize = 5;

/// A weak reference to a component that contributed to a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedComponent {
    pub component_id: Uuid,
    pub title: String,
    pub component_type: String,
    /// `None` when the component came from the fallback path.
    pub similarity: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchMetadata {
    pub calculation_time_ms: f64,
    pub cached: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// 0–100, the sum of the breakdown values.
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub missing_skills: Vec<String>,
    pub suggestions: Vec<String>,
    pub top_matched_components: Vec<MatchedComponent>,
    pub metadata: MatchMetadata,
}

impl MatchResult {
    fn served_from_cache(mut self, lookup: Duration) -> Self {
        self.metadata = MatchMetadata {
            calculation_time_ms: millis(lookup),
            cached: true,
            timestamp: Utc::now(),
        };
        self
    }
}

pub struct MatchEngine {
    retriever: RelevanceRetriever,
    store: Arc<dyn ComponentStore>,
    jd_parser: JdParser,
    cache: Arc<dyn ResultCache>,
    inflight: InflightRequests,
    scoring: ScoringConfig,
    cache_ttl: Duration,
    candidate_limit: usize,
}

impl MatchEngine {
    pub fn new(
        retriever: RelevanceRetriever,
        store: Arc<dyn ComponentStore>,
        jd_parser: JdParser,
        cache: Arc<dyn ResultCache>,
        scoring: ScoringConfig,
        cache_ttl: Duration,
        candidate_limit: usize,
    ) -> Self {
        Self {
            retriever,
            store,
            jd_parser,
            cache,
            inflight: InflightRequests::new(),
            scoring,
            cache_ttl,
            candidate_limit,
        }
    }

    /// Scores the owner's components against a job description.
    pub async fn score(&self, owner_id: Uuid, job_description: &str) -> Result<MatchResult, AppError> {
        validate_owner(owner_id)?;
        let started = Instant::now();
        let key = cache_key(owner_id, job_description);

        if let Some(hit) = self.cache.get(&key).await {
            debug!("Match cache hit for user {owner_id}");
            return Ok(hit.served_from_cache(started.elapsed()));
        }

        let _guard = self.inflight.acquire(&key).await;
        if let Some(hit) = self.cache.get(&key).await {
            debug!("Match cache filled while waiting for user {owner_id}");
            return Ok(hit.served_from_cache(started.elapsed()));
        }

        let result = self.compute(owner_id, job_description, started).await?;
        self.cache.put(&key, &result, self.cache_ttl).await;

        info!(
            "Match score {:.2} for user {owner_id} in {:.1}ms",
            result.score, result.metadata.calculation_time_ms
        );
        Ok(result)
    }

    /// Candidate components for a job description, without scoring.
    pub async fn relevant_components(
        &self,
        owner_id: Uuid,
        job_description: &str,
        limit: usize,
    ) -> Result<Vec<RankedComponent>, AppError> {
        validate_owner(owner_id)?;
        self.retriever
            .find_relevant_components(owner_id, job_description, limit)
            .await
    }

    async fn compute(
        &self,
        owner_id: Uuid,
        job_description: &str,
        started: Instant,
    ) -> Result<MatchResult, AppError> {
        let (candidates, metadata, owned) = tokio::try_join!(
            self.retriever
                .find_relevant_components(owner_id, job_description, self.candidate_limit),
            self.jd_parser.parse(job_description),
            self.store.list_for_owner(owner_id),
        )?;

        let (breakdown, counts) = score_categories(&candidates, &self.scoring);
        let missing_skills = detect_missing_skills(&metadata, &skill_names(&owned));
        let suggestions =
            generate_suggestions(&breakdown, &missing_skills, &counts, &self.scoring.weights);

        Ok(MatchResult {
            score: breakdown.total(),
            breakdown,
            missing_skills,
            suggestions,
            top_matched_components: top_matches(&candidates),
            metadata: MatchMetadata {
                calculation_time_ms: millis(started.elapsed()),
                cached: false,
                timestamp: Utc::now(),
            },
        })
    }
}

fn validate_owner(owner_id: Uuid) -> Result<(), AppError> {
    if owner_id.is_nil() {
        return Err(AppError::Validation("user_id is required".to_string()));
    }
    Ok(())
}

fn skill_names(components: &[Component]) -> Vec<String> {
    components
        .iter()
        .filter(|c| c.category() == Some(Category::Skill))
        .map(|c| c.title.clone())
        .collect()
}

fn top_matches(candidates: &[RankedComponent]) -> Vec<MatchedComponent> {
    candidates
        .iter()
        .filter(|r| r.component.category().is_some())
        .take(TOP_MATCHES)
        .map(|r| MatchedComponent {
            component_id: r.component.id,
            title: r.component.title.clone(),
            component_type: r.component.kind.type_str().to_string(),
            similarity: r.similarity,
        })
        .collect()
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
