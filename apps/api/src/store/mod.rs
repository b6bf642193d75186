//! Persistence seams consumed by the engine.
//!
//! Every method is scoped to one owner. Implementations must never return another
//! owner's components.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::component::{Component, ComponentText, RankedComponent};
use crate::models::profile::Profile;

pub mod postgres;

/// A stored row that could not be decoded into a `Component`.
#[derive(Debug)]
pub struct UndecodableComponent {
    pub component_id: Uuid,
    pub error: AppError,
}

pub type PendingComponent = Result<Component, UndecodableComponent>;

#[async_trait]
pub trait ComponentStore: Send + Sync {
    /// All of the owner's components, newest first.
    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Component>, AppError>;

    /// Nearest neighbours of `query` among the owner's embedded components,
    /// most similar first. Returns an empty list when nothing matches.
    async fn similarity_search(
        &self,
        owner_id: Uuid,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<RankedComponent>, AppError>;

    /// Up to `limit` of the owner's components that have no embedding yet.
    /// A row that cannot be decoded comes back as an `Err` entry; it never
    /// fails the call.
    async fn missing_embeddings(
        &self,
        owner_id: Uuid,
        limit: usize,
    ) -> Result<Vec<PendingComponent>, AppError>;

    async fn store_embedding(
        &self,
        owner_id: Uuid,
        component_id: Uuid,
        embedding: &[f32],
    ) -> Result<(), AppError>;

    /// Rewrites the component's text and clears its embedding in the same write.
    /// Returns `false` when the owner has no such component.
    async fn update_text(
        &self,
        owner_id: Uuid,
        component_id: Uuid,
        text: ComponentText,
    ) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// The owner's profile; an owner without a profile row gets an empty one.
    async fn get_profile(&self, owner_id: Uuid) -> Result<Profile, AppError>;
}
