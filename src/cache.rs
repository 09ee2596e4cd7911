//! Persistent schema cache
//!
//! Downloaded XSD bytes are kept on disk via `cacache`, with a JSON metadata
//! sidecar per entry carrying creation and expiry timestamps. Expired entries are
//! removed lazily on access.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{ConvertError, Result};

/// Metadata for cached schema entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub key: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub size_bytes: u64,
}

impl CacheMetadata {
    pub fn new(key: String, url: String, ttl: Duration) -> Self {
        let now = Utc::now();
        let expires_at =
            now + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::hours(24));

        Self {
            key,
            url,
            created_at: now,
            expires_at,
            size_bytes: 0,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size_bytes = size;
        self
    }
}

/// A cached schema with its data and metadata.
#[derive(Debug, Clone)]
pub struct CachedSchema {
    pub data: Vec<u8>,
    pub metadata: CacheMetadata,
}

/// Disk cache using cacache for persistent, corruption-resistant storage.
pub struct DiskCache {
    cache_dir: PathBuf,
    ttl: Duration,
}

impl DiskCache {
    pub fn new(cache_dir: PathBuf, ttl: Duration) -> Self {
        Self { cache_dir, ttl }
    }

    /// Generate a cache key from a URL
    pub fn generate_key(url: &str) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        url.hash(&mut hasher);
        format!("schema_{:x}", hasher.finish())
    }

    /// Get a schema by URL, or `None` when absent or expired.
    pub async fn get(&self, url: &str) -> Result<Option<CachedSchema>> {
        let key = Self::generate_key(url);

        let metadata = match self.get_metadata(&key).await? {
            Some(metadata) if !metadata.is_expired() => metadata,
            _ => {
                // Clean up expired entry
                let _ = self.remove(url).await;
                return Ok(None);
            }
        };

        match cacache::read(&self.cache_dir, &key).await {
            Ok(data) => Ok(Some(CachedSchema { data, metadata })),
            Err(cacache::Error::EntryNotFound(_, _)) => Ok(None),
            Err(e) => Err(ConvertError::Cache(format!(
                "Failed to read from disk cache: {e}"
            ))),
        }
    }

    /// Store schema bytes under a URL key.
    pub async fn set(&self, url: &str, data: &[u8]) -> Result<()> {
        let key = Self::generate_key(url);
        let metadata = CacheMetadata::new(key.clone(), url.to_string(), self.ttl)
            .with_size(data.len() as u64);

        cacache::write(&self.cache_dir, &key, data)
            .await
            .map_err(|e| ConvertError::Cache(format!("Failed to write to disk cache: {e}")))?;

        self.set_metadata(&key, &metadata).await
    }

    /// Remove an entry and its metadata.
    pub async fn remove(&self, url: &str) -> Result<()> {
        let key = Self::generate_key(url);
        let _ = cacache::remove(&self.cache_dir, &key).await;
        let _ = fs::remove_file(self.metadata_path(&key)).await;
        Ok(())
    }

    /// Whether a non-expired entry exists for the URL.
    pub async fn contains(&self, url: &str) -> Result<bool> {
        let key = Self::generate_key(url);
        match self.get_metadata(&key).await? {
            Some(metadata) => Ok(!metadata.is_expired()),
            None => Ok(false),
        }
    }

    async fn get_metadata(&self, key: &str) -> Result<Option<CacheMetadata>> {
        let metadata_path = self.metadata_path(key);

        match fs::read_to_string(&metadata_path).await {
            Ok(content) => {
                let metadata: CacheMetadata = serde_json::from_str(&content)
                    .map_err(|e| ConvertError::Cache(format!("Failed to parse metadata: {e}")))?;
                Ok(Some(metadata))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ConvertError::Cache(format!("Failed to read metadata: {e}"))),
        }
    }

    async fn set_metadata(&self, key: &str, metadata: &CacheMetadata) -> Result<()> {
        let metadata_path = self.metadata_path(key);

        if let Some(parent) = metadata_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                ConvertError::Cache(format!("Failed to create metadata directory: {e}"))
            })?;
        }

        let content = serde_json::to_string_pretty(metadata)
            .map_err(|e| ConvertError::Cache(format!("Failed to serialize metadata: {e}")))?;

        fs::write(&metadata_path, content)
            .await
            .map_err(|e| ConvertError::Cache(format!("Failed to write metadata: {e}")))
    }

    fn metadata_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join("metadata").join(format!("{key}.json"))
    }
}
