mod config;
mod db;
mod embedding;
mod errors;
mod generation;
mod llm_client;
mod matching;
mod models;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::embedding::backfill::EmbeddingBackfill;
use crate::embedding::GeminiEmbedder;
use crate::generation::generator::CvGenerator;
use crate::generation::selector::ComponentSelector;
use crate::generation::variants::VariantGenerator;
use crate::llm_client::LlmClient;
use crate::matching::cache::{MemoryCache, RedisCache, ResultCache};
use crate::matching::engine::MatchEngine;
use crate::matching::jd_parser::JdParser;
use crate::matching::retriever::RelevanceRetriever;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::{PgComponentStore, PgProfileStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing or malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cv-matcher v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let components = Arc::new(PgComponentStore::new(db.clone()));
    let profiles = Arc::new(PgProfileStore::new(db));

    // Initialize model clients
    let embedder = Arc::new(GeminiEmbedder::new(
        config.gemini_api_key.clone(),
        config.upstream_timeout,
    )?);
    let llm = Arc::new(LlmClient::new(
        config.anthropic_api_key.clone(),
        config.upstream_timeout,
    )?);
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let cache = build_cache(&config).await;

    let retriever = RelevanceRetriever::new(embedder.clone(), components.clone());
    let selector = ComponentSelector::new(llm.clone());

    let matcher = MatchEngine::new(
        retriever.clone(),
        components.clone(),
        JdParser::new(llm),
        cache,
        config.scoring,
        config.cache_ttl,
        config.candidate_limit,
    );
    let generator = CvGenerator::new(
        retriever,
        profiles,
        selector.clone(),
        VariantGenerator::new(selector, config.scoring),
        config.candidate_limit,
    );
    let backfill = EmbeddingBackfill::new(embedder, components, config.backfill_batch_size);

    // Build app state
    let state = AppState {
        config: config.clone(),
        matcher: Arc::new(matcher),
        generator: Arc::new(generator),
        backfill: Arc::new(backfill),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Redis when `REDIS_URL` is set and reachable, process memory otherwise.
async fn build_cache(config: &Config) -> Arc<dyn ResultCache> {
    let Some(url) = config.redis_url.as_deref() else {
        info!("REDIS_URL not set; match cache is in-process");
        return Arc::new(MemoryCache::new());
    };

    let connected = match redis::Client::open(url) {
        Ok(client) => RedisCache::connect(&client).await,
        Err(e) => Err(e),
    };

    match connected {
        Ok(cache) => {
            info!("Match cache backed by Redis");
            Arc::new(cache)
        }
        Err(e) => {
            warn!("Redis unavailable ({e}); falling back to in-process match cache");
            Arc::new(MemoryCache::new())
        }
    }
}
