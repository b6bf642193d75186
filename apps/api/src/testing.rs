//! In-memory stand-ins for the external collaborators, shared by unit tests.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::embedding::EmbeddingProvider;
use crate::errors::{AppError, UpstreamError};
use crate::llm_client::TextGenerator;
use crate::models::component::{
    Component, ComponentKind, ComponentText, RankedComponent, EMBEDDING_DIMENSIONS,
};
use crate::models::profile::Profile;
use crate::store::{ComponentStore, PendingComponent, ProfileStore, UndecodableComponent};

// ────────────────────────────────────────────────────────────────────────────
// Builders
// ────────────────────────────────────────────────────────────────────────────

pub fn component(owner_id: Uuid, kind: ComponentKind, title: &str) -> Component {
    Component {
        id: Uuid::new_v4(),
        owner_id,
        kind,
        title: title.to_string(),
        organization: None,
        description: None,
        highlights: vec![],
        start_date: None,
        end_date: None,
        embedding: None,
    }
}

pub fn experience(owner_id: Uuid, title: &str, organization: &str) -> Component {
    let mut c = component(owner_id, ComponentKind::Experience { location: None }, title);
    c.organization = Some(organization.to_string());
    c
}

pub fn education(owner_id: Uuid, title: &str, organization: &str) -> Component {
    let mut c = component(
        owner_id,
        ComponentKind::Education {
            degree: Some(title.to_string()),
            field_of_study: None,
        },
        title,
    );
    c.organization = Some(organization.to_string());
    c
}

pub fn skill(owner_id: Uuid, name: &str) -> Component {
    component(
        owner_id,
        ComponentKind::Skill {
            level: None,
            skill_category: None,
        },
        name,
    )
}

pub fn project(owner_id: Uuid, title: &str) -> Component {
    component(
        owner_id,
        ComponentKind::Project {
            technologies: vec![],
            url: None,
        },
        title,
    )
}

pub fn profile(full_name: &str, profession: &str) -> Profile {
    Profile {
        full_name: Some(full_name.to_string()),
        profession: Some(profession.to_string()),
        ..Profile::default()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Embedding provider
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic embedder: hashed bag of words, L2-normalised.
///
/// `constant()` maps every text to the same vector so every search hit has
/// similarity 1.0.
pub struct FakeEmbedder {
    calls: AtomicUsize,
    delay: Option<Duration>,
    fail_on: Vec<String>,
    constant: bool,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: None,
            fail_on: Vec::new(),
            constant: false,
        }
    }

    pub fn constant() -> Self {
        Self {
            constant: true,
            ..Self::new()
        }
    }

    /// Sleeps (on the tokio clock) before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fails every text containing `needle`.
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on.push(needle.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; EMBEDDING_DIMENSIONS];
        if self.constant {
            vector[0] = 1.0;
            return vector;
        }
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() % EMBEDDING_DIMENSIONS as u64) as usize] += 1.0;
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_on.iter().any(|needle| text.contains(needle.as_str())) {
            return Err(UpstreamError::RateLimited { service: "fake" });
        }
        Ok(self.vector_for(text))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stores
// ────────────────────────────────────────────────────────────────────────────

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

/// Owner-scoped component store over a `Vec`.
#[derive(Default)]
pub struct MemoryComponentStore {
    components: Mutex<Vec<Component>>,
    empty_search: bool,
    failing_writes: HashSet<Uuid>,
    undecodable: HashSet<Uuid>,
    searches: AtomicUsize,
}

impl MemoryComponentStore {
    pub fn new(components: Vec<Component>) -> Self {
        Self {
            components: Mutex::new(components),
            ..Self::default()
        }
    }

    /// Similarity search always comes back empty.
    pub fn with_empty_search(mut self) -> Self {
        self.empty_search = true;
        self
    }

    /// `store_embedding` fails for this component.
    pub fn failing_write_for(mut self, component_id: Uuid) -> Self {
        self.failing_writes.insert(component_id);
        self
    }

    /// `missing_embeddings` reports this component as an undecodable row.
    pub fn undecodable(mut self, component_id: Uuid) -> Self {
        self.undecodable.insert(component_id);
        self
    }

    /// Embeds every stored component with `embedder`'s vectors.
    pub fn embed_all(self, embedder: &FakeEmbedder) -> Self {
        for c in self.components.lock().unwrap().iter_mut() {
            c.embedding = Some(embedder.vector_for(&c.embedding_text()));
        }
        self
    }

    pub fn get(&self, component_id: Uuid) -> Option<Component> {
        self.components
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == component_id)
            .cloned()
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    fn owned(&self, owner_id: Uuid) -> Vec<Component> {
        self.components
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ComponentStore for MemoryComponentStore {
    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Component>, AppError> {
        Ok(self.owned(owner_id))
    }

    async fn similarity_search(
        &self,
        owner_id: Uuid,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<RankedComponent>, AppError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        if self.empty_search {
            return Ok(vec![]);
        }
        let mut ranked: Vec<RankedComponent> = self
            .owned(owner_id)
            .into_iter()
            .filter_map(|c| {
                let similarity = cosine_similarity(c.embedding.as_deref()?, query);
                Some(RankedComponent {
                    component: c,
                    similarity: Some(similarity),
                })
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(top_k);
        Ok(ranked)
    }

    async fn missing_embeddings(
        &self,
        owner_id: Uuid,
        limit: usize,
    ) -> Result<Vec<PendingComponent>, AppError> {
        Ok(self
            .owned(owner_id)
            .into_iter()
            .filter(|c| c.embedding.is_none())
            .take(limit)
            .map(|c| {
                if self.undecodable.contains(&c.id) {
                    Err(UndecodableComponent {
                        component_id: c.id,
                        error: AppError::Validation(format!(
                            "component {} has unsupported type 'tiktok_post'",
                            c.id
                        )),
                    })
                } else {
                    Ok(c)
                }
            })
            .collect())
    }

    async fn store_embedding(
        &self,
        owner_id: Uuid,
        component_id: Uuid,
        embedding: &[f32],
    ) -> Result<(), AppError> {
        if self.failing_writes.contains(&component_id) {
            return Err(AppError::Internal(anyhow::anyhow!("write rejected")));
        }
        let mut components = self.components.lock().unwrap();
        let target = components
            .iter_mut()
            .find(|c| c.id == component_id && c.owner_id == owner_id)
            .ok_or_else(|| AppError::NotFound(format!("Component {component_id} not found")))?;
        target.embedding = Some(embedding.to_vec());
        Ok(())
    }

    async fn update_text(
        &self,
        owner_id: Uuid,
        component_id: Uuid,
        text: ComponentText,
    ) -> Result<bool, AppError> {
        let mut components = self.components.lock().unwrap();
        let Some(target) = components
            .iter_mut()
            .find(|c| c.id == component_id && c.owner_id == owner_id)
        else {
            return Ok(false);
        };
        target.title = text.title;
        target.description = text.description;
        target.highlights = text.highlights;
        target.embedding = None;
        Ok(true)
    }
}

#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: Mutex<Vec<(Uuid, Profile)>>,
}

impl MemoryProfileStore {
    pub fn with_profile(owner_id: Uuid, profile: Profile) -> Self {
        Self {
            profiles: Mutex::new(vec![(owner_id, profile)]),
        }
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get_profile(&self, owner_id: Uuid) -> Result<Profile, AppError> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _)| *id == owner_id)
            .map(|(_, p)| p.clone())
            .unwrap_or_default())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generative model
// ────────────────────────────────────────────────────────────────────────────

type Responder = Box<dyn Fn(&str) -> Result<String, UpstreamError> + Send + Sync>;

/// Answers prompts from a closure and records every prompt it receives.
pub struct ScriptedGenerator {
    respond: Responder,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn from_fn(
        respond: impl Fn(&str) -> Result<String, UpstreamError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always(response: &str) -> Self {
        let response = response.to_string();
        Self::from_fn(move |_| Ok(response.clone()))
    }

    pub fn failing() -> Self {
        Self::from_fn(|_| Err(UpstreamError::Timeout { service: "fake" }))
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, _system: &str) -> Result<String, UpstreamError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.respond)(prompt)
    }
}
