//! Komal Core Library
//!
//! Resolves Komga series names to MyAnimeList records, normalizes those
//! records into Komga's metadata schema, and talks to both services.

pub mod cache;
pub mod catalog;
pub mod cover;
pub mod error;
pub mod locator;
pub mod normalize;
pub mod processed_log;
pub mod prompt;
pub mod provider;
pub mod resolver;

// Re-export main types
pub use cache::{FileCache, IdentifierCache, MemoryCache};
pub use catalog::{
    Catalog, CatalogEntry, CatalogListing, KomgaClient, KomgaConfig, MetadataPatch,
};
pub use cover::{CoverSource, CoverTransfer, HttpCoverSource, transfer_cover};
pub use error::{Error, Result};
pub use locator::{RecordId, extract_id, manga_url};
pub use normalize::{MetadataRecord, RATING_MARKER, SeriesStatus, normalize};
pub use processed_log::{FileProcessedLog, MemoryProcessedLog, NoOpProcessedLog, ProcessedLog};
pub use prompt::{Candidate, Choice, Prompter};
pub use provider::{JikanClient, JikanConfig, MetadataProvider, RawManga};
pub use resolver::{Interaction, MetadataResolver, Provenance, Resolution, ResolverOptions};
