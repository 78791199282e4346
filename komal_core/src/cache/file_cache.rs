//! File-based cache implementation
//!
//! This module provides an identifier cache that persists to a JSON object on
//! disk (`{ "<series name>": "<MyAnimeList URL>" }`). The whole mapping is
//! rewritten on every change.

use crate::cache::traits::IdentifierCache;
use crate::error::{Error, Result};
use async_trait::async_trait;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

const STORE_NAME: &str = "identifier cache";

/// File-based cache for series name to locator mappings
pub struct FileCache {
    cache_file: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileCache {
    /// Open the cache backed by `cache_file`
    ///
    /// A missing or unreadable file yields an empty cache; only failing to
    /// create the parent directory is an error.
    pub fn open(cache_file: PathBuf) -> Result<Self> {
        if let Some(parent) = cache_file.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::persistence(
                    STORE_NAME,
                    format!("failed to create {}: {e}", parent.display()),
                )
            })?;
        }

        let entries = Self::load_from_disk(&cache_file);
        debug!(
            "Loaded {} cached locator(s) from {}",
            entries.len(),
            cache_file.display()
        );

        Ok(Self {
            cache_file,
            entries: RwLock::new(entries),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.cache_file
    }

    /// Load cache entries from disk
    fn load_from_disk(cache_file: &Path) -> BTreeMap<String, String> {
        if !cache_file.exists() {
            return BTreeMap::new();
        }

        let data = match std::fs::read_to_string(cache_file) {
            Ok(data) => data,
            Err(e) => {
                warn!(
                    "Failed to read cache {}: {e}; starting empty",
                    cache_file.display()
                );
                return BTreeMap::new();
            }
        };

        match serde_json::from_str(&data) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Cache {} is corrupt ({e}); treating every entry as a miss",
                    cache_file.display()
                );
                BTreeMap::new()
            }
        }
    }

    /// Save cache entries to disk
    async fn save_to_disk(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let data = serde_json::to_string_pretty(entries)
            .map_err(|e| Error::persistence(STORE_NAME, format!("failed to serialize: {e}")))?;

        let tmp_file = self.cache_file.with_extension("json.tmp");

        let mut file = fs::File::create(&tmp_file).await.map_err(|e| {
            Error::persistence(
                STORE_NAME,
                format!("failed to create {}: {e}", tmp_file.display()),
            )
        })?;
        file.write_all(data.as_bytes())
            .await
            .map_err(|e| Error::persistence(STORE_NAME, format!("failed to write: {e}")))?;
        file.sync_all()
            .await
            .map_err(|e| Error::persistence(STORE_NAME, format!("failed to sync: {e}")))?;

        fs::rename(&tmp_file, &self.cache_file).await.map_err(|e| {
            Error::persistence(
                STORE_NAME,
                format!("failed to replace {}: {e}", self.cache_file.display()),
            )
        })?;

        Ok(())
    }
}

#[async_trait]
impl IdentifierCache for FileCache {
    async fn lookup(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn store(&self, key: &str, locator: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        let previous = entries.insert(key.to_string(), locator.to_string());

        if let Err(e) = self.save_to_disk(&entries).await {
            // Keep memory and disk in agreement
            match previous {
                Some(previous) => entries.insert(key.to_string(), previous),
                None => entries.remove(key),
            };
            return Err(e);
        }

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write().await;

        let Some(previous) = entries.remove(key) else {
            return Ok(false);
        };

        if let Err(e) = self.save_to_disk(&entries).await {
            entries.insert(key.to_string(), previous);
            return Err(e);
        }

        Ok(true)
    }

    async fn entries(&self) -> Result<Vec<(String, String)>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
