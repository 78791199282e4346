//! Memory-based cache implementation
//!
//! Holds the mapping for the lifetime of the process only. Used by tests and
//! by runs that should not touch the on-disk cache.

use crate::cache::traits::IdentifierCache;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// In-memory cache for series name to locator mappings
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache pre-populated with `entries`
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl IdentifierCache for MemoryCache {
    async fn lookup(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn store(&self, key: &str, locator: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), locator.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn entries(&self) -> Result<Vec<(String, String)>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
