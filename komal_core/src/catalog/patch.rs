//! Metadata write payload

use crate::normalize::{MetadataRecord, SeriesStatus};
use serde::{Deserialize, Serialize};

/// Body of `PATCH /api/v1/series/{id}/metadata`
///
/// Every field written is also locked so the catalog's own detection does not
/// overwrite it on the next library scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataPatch {
    pub status: SeriesStatus,
    pub status_lock: bool,
    pub summary: String,
    pub summary_lock: bool,
    pub publisher: String,
    pub publisher_lock: bool,
    pub genres: Vec<String>,
    pub genres_lock: bool,
    pub tags: Vec<String>,
    pub tags_lock: bool,
}

impl MetadataPatch {
    /// Build a payload with every lock flag set
    pub fn locked(record: &MetadataRecord) -> Self {
        Self {
            status: record.status,
            status_lock: true,
            summary: record.summary.clone(),
            summary_lock: true,
            publisher: record.publisher.clone(),
            publisher_lock: true,
            genres: record.genres.clone(),
            genres_lock: true,
            tags: record.tags.clone(),
            tags_lock: true,
        }
    }

    pub fn all_locked(&self) -> bool {
        self.status_lock
            && self.summary_lock
            && self.publisher_lock
            && self.genres_lock
            && self.tags_lock
    }
}
