//! Cache trait definitions
//!
//! This module defines the IdentifierCache trait that all cache implementations must implement.

use crate::error::Result;
use async_trait::async_trait;

/// Mapping from catalog entry name to provider locator
#[async_trait]
pub trait IdentifierCache: Send + Sync {
    /// Look up the locator stored for a catalog entry name
    ///
    /// Has no side effects. Returns `Ok(None)` on a miss.
    async fn lookup(&self, key: &str) -> Result<Option<String>>;

    /// Store a locator, replacing any previous one for `key`
    ///
    /// Durable implementations persist the whole mapping before returning and
    /// report a persistence failure as an error.
    async fn store(&self, key: &str, locator: &str) -> Result<()>;

    /// Remove a mapping, persisting the change like `store`
    ///
    /// Returns whether an entry was removed.
    async fn remove(&self, key: &str) -> Result<bool>;

    /// Snapshot of all entries, sorted by key
    async fn entries(&self) -> Result<Vec<(String, String)>>;
}
