//! In-process cache backend.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::cache::{is_expired, CacheConfig, CacheStore};
use crate::error::StoreError;

struct Entry {
    expires_at: DateTime<Utc>,
    value: String,
}

/// A cache held in a mutex-guarded map. Entries live as long as the process.
pub struct MemoryCache {
    config: CacheConfig,
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    fn name(&self) -> &str {
        "memory"
    }

    fn config(&self) -> &CacheConfig {
        &self.config
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let full_key = self.config.full_key(key);
        let mut entries = self.lock();
        match entries.get(&full_key) {
            None => return Ok(None),
            Some(entry) if !is_expired(entry.expires_at) => return Ok(Some(entry.value.clone())),
            Some(_) => {}
        }
        tracing::warn!(key = %full_key, "cache entry expired, removing");
        entries.remove(&full_key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let entry = Entry {
            expires_at: self.config.expires_at(Utc::now()),
            value: value.to_string(),
        };
        self.lock().insert(self.config.full_key(key), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.lock().remove(&self.config.full_key(key)).is_some())
    }

    async fn clear(&self) -> Result<usize, StoreError> {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(&self.config.prefix));
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_delete() {
        let cache = MemoryCache::new(CacheConfig::default());
        assert!(cache.get("k").await.unwrap().is_none());

        cache.set("k", "v1").await.unwrap();
        cache.set("k", "v2").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v2"));
        assert_eq!(cache.len(), 1);

        assert!(cache.delete("k").await.unwrap());
        assert!(!cache.delete("k").await.unwrap());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn expired_entries_read_as_absent() {
        let cache = MemoryCache::new(CacheConfig::new("p:", 0));
        cache.set("k", "v").await.unwrap();
        assert!(cache.get("k").await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn clear_reports_count() {
        let cache = MemoryCache::new(CacheConfig::default());
        cache.set("a", "1").await.unwrap();
        cache.set("b", "2").await.unwrap();
        assert_eq!(cache.clear().await.unwrap(), 2);
        assert!(cache.get("a").await.unwrap().is_none());
    }
}
