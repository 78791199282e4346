//! External metadata provider
//!
//! The resolver only needs two capabilities from the provider: a free-text
//! search and a fetch by identifier. `JikanClient` implements both against
//! the Jikan v4 API; tests substitute a mock.

pub mod jikan;
pub mod raw;

pub use jikan::{JikanClient, JikanConfig};
pub use raw::RawManga;

use crate::error::Result;
use crate::locator::RecordId;
use async_trait::async_trait;

/// Search and fetch capability of a metadata provider
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Search by name, returning at most `limit` candidates in provider order
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RawManga>>;

    /// Fetch one full record
    ///
    /// Returns `Ok(None)` when the provider has no record for `id`.
    async fn fetch(&self, id: RecordId) -> Result<Option<RawManga>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
