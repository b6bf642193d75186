use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::matching::scoring::{CategoryWeights, SaturationPoints, ScoringConfig};

/// Deployment environment. Controls whether error responses carry diagnostic detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Absent → the match cache stays in process memory.
    pub redis_url: Option<String>,
    /// Checked when the LLM client is built, before any network call.
    pub anthropic_api_key: Option<String>,
    /// Checked when the embedding client is built, before any network call.
    pub gemini_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub environment: Environment,
    pub cache_ttl: Duration,
    pub upstream_timeout: Duration,
    pub candidate_limit: usize,
    pub backfill_batch_size: usize,
    pub scoring: ScoringConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let scoring = ScoringConfig {
            weights: match optional_env("MATCH_WEIGHTS") {
                Some(raw) => CategoryWeights::parse(&raw).context("MATCH_WEIGHTS is invalid")?,
                None => CategoryWeights::default(),
            },
            saturation: match optional_env("MATCH_SATURATION") {
                Some(raw) => {
                    SaturationPoints::parse(&raw).context("MATCH_SATURATION is invalid")?
                }
                None => SaturationPoints::default(),
            },
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: optional_env("REDIS_URL"),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            environment: parse_environment(optional_env("APP_ENV").as_deref())?,
            cache_ttl: Duration::from_secs(parse_env("MATCH_CACHE_TTL_SECS", 300)?),
            upstream_timeout: Duration::from_secs(parse_env("UPSTREAM_TIMEOUT_SECS", 30)?),
            candidate_limit: positive(
                "MATCH_CANDIDATE_LIMIT",
                parse_env("MATCH_CANDIDATE_LIMIT", 50)?,
            )?,
            backfill_batch_size: positive(
                "BACKFILL_BATCH_SIZE",
                parse_env("BACKFILL_BATCH_SIZE", 50)?,
            )?,
            scoring,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

fn positive(key: &str, value: usize) -> Result<usize> {
    if value == 0 {
        bail!("{key} must be greater than zero");
    }
    Ok(value)
}

fn parse_environment(raw: Option<&str>) -> Result<Environment> {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        None | Some("development") | Some("dev") | Some("local") => Ok(Environment::Development),
        Some("production") | Some("prod") => Ok(Environment::Production),
        Some(other) => bail!("APP_ENV must be 'development' or 'production', got '{other}'"),
    }
}
