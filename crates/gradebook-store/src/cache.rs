//! Key/value cache with per-entry expiry.
//!
//! Backends store opaque string payloads under prefixed keys. The typed
//! helpers [`get_json`] and [`set_json`] sit on top for callers that cache
//! structured values such as a student collection.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{CacheBackend, CacheSettings};
use crate::error::StoreError;
use crate::file::FileCache;
use crate::memory::MemoryCache;

/// Key prefix and lifetime shared by every entry of a cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub prefix: String,
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            prefix: "gradebook:".to_string(),
            ttl_secs: 3600,
        }
    }
}

impl CacheConfig {
    pub fn new(prefix: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            prefix: prefix.into(),
            ttl_secs,
        }
    }

    /// The stored key for a caller key.
    pub fn full_key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }

    /// When an entry written at `now` stops being valid.
    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let ttl = i64::try_from(self.ttl_secs).unwrap_or(i64::MAX);
        now.checked_add_signed(Duration::try_seconds(ttl).unwrap_or(Duration::MAX))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

impl From<&CacheSettings> for CacheConfig {
    fn from(settings: &CacheSettings) -> Self {
        CacheConfig::new(settings.prefix.clone(), settings.ttl_secs)
    }
}

/// `true` once `expires_at` has been reached.
pub(crate) fn is_expired(expires_at: DateTime<Utc>) -> bool {
    Utc::now() >= expires_at
}

/// Trait for cache backends.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Backend name (e.g. "file").
    fn name(&self) -> &str;

    fn config(&self) -> &CacheConfig;

    /// Payload stored under `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store a payload; it expires `ttl_secs` from now.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove one entry. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Remove every entry under this cache's prefix. Returns how many were removed.
    async fn clear(&self) -> Result<usize, StoreError>;
}

/// Read and decode a JSON payload.
pub async fn get_json<T: DeserializeOwned>(
    cache: &dyn CacheStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match cache.get(key).await? {
        Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
        None => Ok(None),
    }
}

/// Encode a value as JSON and store it.
pub async fn set_json<T: Serialize + ?Sized>(
    cache: &dyn CacheStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let payload = serde_json::to_string(value)?;
    cache.set(key, &payload).await
}

/// Build the configured backend, or `None` when caching is disabled.
pub fn create_cache(settings: &CacheSettings) -> Option<Box<dyn CacheStore>> {
    let config = CacheConfig::from(settings);
    match settings.backend {
        CacheBackend::None => None,
        CacheBackend::Memory => Some(Box::new(MemoryCache::new(config))),
        CacheBackend::File => Some(Box::new(FileCache::new(&settings.dir, config))),
    }
}
