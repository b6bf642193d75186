//! Match result cache with a hard TTL, plus per-key in-flight de-duplication.
//!
//! Cache failures are never errors: a broken backend or an undecodable payload
//! reads as a miss and the result is recomputed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::{OwnedMutexGuard, RwLock};
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::matching::engine::MatchResult;

const REDIS_KEY_PREFIX: &str = "match:";

/// `sha256(owner_id + "|" + trim(lowercase(job_description)))` as lowercase hex.
pub fn cache_key(owner_id: Uuid, job_description: &str) -> String {
    let normalized = job_description.to_lowercase();
    let material = format!("{owner_id}|{}", normalized.trim());
    format!("{:x}", Sha256::digest(material.as_bytes()))
}

#[async_trait]
pub trait ResultCache: Send + Sync {
    /// A live entry, or `None` on miss, expiry or backend failure.
    async fn get(&self, key: &str) -> Option<MatchResult>;

    /// Best effort. Failures are logged, never returned.
    async fn put(&self, key: &str, value: &MatchResult, ttl: Duration);
}

struct MemoryEntry {
    value: MatchResult,
    expires_at: Instant,
}

/// Process-local cache. Expired entries are evicted when read and on every write.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl ResultCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<MatchResult> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return None,
                Some(entry) if Instant::now() < entry.expires_at => {
                    return Some(entry.value.clone())
                }
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| Instant::now() >= entry.expires_at)
        {
            entries.remove(key);
            debug!("Evicted expired match cache entry");
        }
        None
    }

    async fn put(&self, key: &str, value: &MatchResult, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| now < entry.expires_at);
        if entries.len() < before {
            debug!("Evicted {} expired match cache entries", before - entries.len());
        }
        entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.clone(),
                expires_at: now + ttl,
            },
        );
    }
}

/// Redis-backed cache: JSON payloads under `match:{key}` written with `SET .. EX`.
#[derive(Clone)]
pub struct RedisCache {
    connection: redis::aio::MultiplexedConnection,
}

impl RedisCache {
    pub async fn connect(client: &redis::Client) -> Result<Self, redis::RedisError> {
        let connection = client.get_multiplexed_async_connection().await?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl ResultCache for RedisCache {
    async fn get(&self, key: &str) -> Option<MatchResult> {
        let mut connection = self.connection.clone();
        let raw = redis::cmd("GET")
            .arg(format!("{REDIS_KEY_PREFIX}{key}"))
            .query_async::<_, Option<String>>(&mut connection)
            .await;

        match raw {
            Ok(Some(payload)) => decode_payload(&payload),
            Ok(None) => None,
            Err(e) => {
                warn!("Match cache read failed, treating as miss: {e}");
                None
            }
        }
    }

    async fn put(&self, key: &str, value: &MatchResult, ttl: Duration) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Could not serialize match result for cache: {e}");
                return;
            }
        };

        let mut connection = self.connection.clone();
        let written = redis::cmd("SET")
            .arg(format!("{REDIS_KEY_PREFIX}{key}"))
            .arg(payload)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async::<_, ()>(&mut connection)
            .await;

        if let Err(e) = written {
            warn!("Match cache write failed: {e}");
        }
    }
}

fn decode_payload(payload: &str) -> Option<MatchResult> {
    match serde_json::from_str(payload) {
        Ok(result) => Some(result),
        Err(e) => {
            warn!("Malformed cached match result, treating as miss: {e}");
            None
        }
    }
}

type LockMap = Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>;

/// At most one computation per key at a time. Later callers wait for the
/// holder to finish and then re-check the cache.
#[derive(Clone, Default)]
pub struct InflightRequests {
    locks: LockMap,
}

impl InflightRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: &str) -> InflightGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(key.to_string()).or_default().clone()
        };
        let permit = lock.lock_owned().await;
        InflightGuard {
            key: key.to_string(),
            permit: Some(permit),
            locks: self.locks.clone(),
        }
    }

    /// Keys with a holder or waiters.
    #[cfg(test)]
    pub fn active(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Released on drop, including when the owning future is cancelled.
pub struct InflightGuard {
    key: String,
    permit: Option<OwnedMutexGuard<()>>,
    locks: LockMap,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(permit) = self.permit.take() {
            // One reference in the map, one held by this permit: nobody is waiting.
            if Arc::strong_count(OwnedMutexGuard::mutex(&permit)) <= 2 {
                locks.remove(&self.key);
            }
        }
    }
}
