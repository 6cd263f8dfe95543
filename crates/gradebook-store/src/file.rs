//! On-disk cache backend: one JSON file per entry.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::cache::{is_expired, CacheConfig, CacheStore};
use crate::error::StoreError;

/// What each cache file holds.
#[derive(Debug, Serialize, Deserialize)]
struct FileEntry {
    key: String,
    expires_at: DateTime<Utc>,
    value: String,
}

/// A cache that survives between runs.
///
/// Files are named after the SHA-256 of the full key, so any key is safe to
/// use. The directory is created on first write.
pub struct FileCache {
    dir: PathBuf,
    config: CacheConfig,
}

impl FileCache {
    pub fn new(dir: &Path, config: CacheConfig) -> Self {
        Self {
            dir: dir.to_path_buf(),
            config,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, full_key: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(full_key.as_bytes()));
        self.dir.join(format!("{digest}.json"))
    }

    async fn read_entry(path: &Path) -> Result<Option<FileEntry>, StoreError> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(path: &Path) -> Result<bool, StoreError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl CacheStore for FileCache {
    fn name(&self) -> &str {
        "file"
    }

    fn config(&self) -> &CacheConfig {
        &self.config
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let full_key = self.config.full_key(key);
        let path = self.entry_path(&full_key);

        let Some(entry) = Self::read_entry(&path).await? else {
            return Ok(None);
        };
        if entry.key != full_key {
            tracing::warn!(path = %path.display(), "cache file holds another key, ignoring");
            return Ok(None);
        }
        if is_expired(entry.expires_at) {
            tracing::warn!(key = %full_key, "cache entry expired, removing");
            Self::remove(&path).await?;
            return Ok(None);
        }
        Ok(Some(entry.value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let full_key = self.config.full_key(key);
        let entry = FileEntry {
            expires_at: self.config.expires_at(Utc::now()),
            key: full_key,
            value: value.to_string(),
        };
        let path = self.entry_path(&entry.key);
        tokio::fs::write(&path, serde_json::to_vec(&entry)?).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Self::remove(&self.entry_path(&self.config.full_key(key))).await
    }

    async fn clear(&self) -> Result<usize, StoreError> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            match Self::read_entry(&path).await {
                Ok(Some(entry)) if entry.key.starts_with(&self.config.prefix) => {
                    if Self::remove(&path).await? {
                        removed += 1;
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("skipping {}: {}", path.display(), e),
            }
        }
        Ok(removed)
    }
}
