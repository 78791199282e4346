//! Library catalog (Komga)
//!
//! Listing entries, writing locked metadata and uploading cover thumbnails
//! are the only catalog capabilities the reconciler uses.

pub mod komga;
pub mod patch;

pub use komga::{KomgaClient, KomgaConfig};
pub use patch::MetadataPatch;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One series as listed by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
}

impl CatalogEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Result of listing the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogListing {
    #[serde(default)]
    pub content: Vec<CatalogEntry>,
    /// Count reported by the server; used for progress headers
    #[serde(default)]
    pub number_of_elements: usize,
}

impl CatalogListing {
    pub fn new(content: Vec<CatalogEntry>) -> Self {
        let number_of_elements = content.len();
        Self {
            content,
            number_of_elements,
        }
    }

    /// Expected entry count, falling back to the listed content
    pub fn expected(&self) -> usize {
        if self.number_of_elements == 0 {
            self.content.len()
        } else {
            self.number_of_elements
        }
    }
}

/// Read and write access to the library catalog
#[async_trait]
pub trait Catalog: Send + Sync {
    /// List every series; failure here is fatal to a run
    async fn list_series(&self) -> Result<CatalogListing>;

    /// Replace the metadata of one series
    async fn update_metadata(&self, series_id: &str, patch: &MetadataPatch) -> Result<()>;

    /// Upload a JPEG cover for one series
    async fn upload_thumbnail(&self, series_id: &str, image: Vec<u8>) -> Result<()>;
}
