use async_trait::async_trait;
use pgvector::Vector;
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::component::{Component, ComponentRow, ComponentText, RankedComponent};
use crate::models::profile::Profile;
use crate::store::{ComponentStore, PendingComponent, ProfileStore, UndecodableComponent};

const COMPONENT_COLUMNS: &str = "id, user_id, component_type, title, organization, description, \
     highlights, start_date, end_date, details, embedding";

#[derive(Debug, FromRow)]
struct SimilarityRow {
    #[sqlx(flatten)]
    component: ComponentRow,
    similarity: f64,
}

/// Components table with a pgvector `embedding vector(768)` column.
#[derive(Clone)]
pub struct PgComponentStore {
    pool: PgPool,
}

impl PgComponentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn decode_rows(rows: Vec<ComponentRow>) -> Result<Vec<Component>, AppError> {
    rows.into_iter().map(Component::try_from).collect()
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl ComponentStore for PgComponentStore {
    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Component>, AppError> {
        let rows = sqlx::query_as::<_, ComponentRow>(&format!(
            "SELECT {COMPONENT_COLUMNS} FROM components WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        decode_rows(rows)
    }

    async fn similarity_search(
        &self,
        owner_id: Uuid,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<RankedComponent>, AppError> {
        // `<=>` is cosine distance in [0, 2]; similarity = 1 - distance.
        let rows = sqlx::query_as::<_, SimilarityRow>(&format!(
            r#"
            SELECT {COMPONENT_COLUMNS}, 1 - (embedding <=> $2) AS similarity
            FROM components
            WHERE user_id = $1 AND embedding IS NOT NULL
            ORDER BY embedding <=> $2
            LIMIT $3
            "#
        ))
        .bind(owner_id)
        .bind(Vector::from(query.to_vec()))
        .bind(to_i64(top_k))
        .fetch_all(&self.pool)
        .await?;

        debug!("Similarity search for user {owner_id} returned {} rows", rows.len());

        rows.into_iter()
            .map(|row| {
                Ok(RankedComponent {
                    similarity: Some(row.similarity.clamp(0.0, 1.0) as f32),
                    component: Component::try_from(row.component)?,
                })
            })
            .collect()
    }

    async fn missing_embeddings(
        &self,
        owner_id: Uuid,
        limit: usize,
    ) -> Result<Vec<PendingComponent>, AppError> {
        let rows = sqlx::query_as::<_, ComponentRow>(&format!(
            "SELECT {COMPONENT_COLUMNS} FROM components \
             WHERE user_id = $1 AND embedding IS NULL \
             ORDER BY created_at ASC LIMIT $2"
        ))
        .bind(owner_id)
        .bind(to_i64(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let component_id = row.id;
                Component::try_from(row).map_err(|error| UndecodableComponent {
                    component_id,
                    error,
                })
            })
            .collect())
    }

    async fn store_embedding(
        &self,
        owner_id: Uuid,
        component_id: Uuid,
        embedding: &[f32],
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE components SET embedding = $1, updated_at = NOW() WHERE id = $2 AND user_id = $3",
        )
        .bind(Vector::from(embedding.to_vec()))
        .bind(component_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Component {component_id} not found"
            )));
        }
        Ok(())
    }

    async fn update_text(
        &self,
        owner_id: Uuid,
        component_id: Uuid,
        text: ComponentText,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE components
            SET title = $1, description = $2, highlights = $3,
                embedding = NULL, updated_at = NOW()
            WHERE id = $4 AND user_id = $5
            "#,
        )
        .bind(&text.title)
        .bind(&text.description)
        .bind(&text.highlights)
        .bind(component_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get_profile(&self, owner_id: Uuid) -> Result<Profile, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT full_name, profession, email, phone, location, summary,
                   COALESCE(links, '{}') AS links
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile.unwrap_or_default())
    }
}
