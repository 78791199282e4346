//! Mock catalog

use async_trait::async_trait;
use komal_core::{Catalog, CatalogEntry, CatalogListing, Error, MetadataPatch, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Mock implementation of `Catalog`
///
/// Records every metadata write and thumbnail upload. Writes for selected
/// series ids can be made to fail always or a fixed number of times.
#[derive(Clone, Default)]
pub struct MockCatalog {
    behavior: Arc<Mutex<MockBehavior>>,
}

#[derive(Default)]
struct MockBehavior {
    entries: Vec<CatalogEntry>,
    listing_fails: bool,
    failing_updates: HashSet<String>,
    update_failures_remaining: HashMap<String, usize>,
    thumbnail_fails: bool,
    update_attempts: Vec<String>,
    patches: Vec<(String, MetadataPatch)>,
    thumbnails: Vec<(String, usize)>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding `(id, name)` series
    pub fn with_series(series: &[(&str, &str)]) -> Self {
        let catalog = Self::new();
        for (id, name) in series {
            catalog.add_series(id, name);
        }
        catalog
    }

    fn behavior(&self) -> std::sync::MutexGuard<'_, MockBehavior> {
        self.behavior.lock().unwrap()
    }

    pub fn add_series(&self, id: &str, name: &str) {
        self.behavior().entries.push(CatalogEntry::new(id, name));
    }

    pub fn set_listing_fails(&self, fails: bool) {
        self.behavior().listing_fails = fails;
    }

    /// Every metadata write for `id` is rejected
    pub fn fail_updates_for(&self, id: &str) {
        self.behavior().failing_updates.insert(id.to_string());
    }

    /// The next `count` metadata writes for `id` are rejected
    pub fn fail_next_updates_for(&self, id: &str, count: usize) {
        self.behavior()
            .update_failures_remaining
            .insert(id.to_string(), count);
    }

    pub fn set_thumbnail_fails(&self, fails: bool) {
        self.behavior().thumbnail_fails = fails;
    }

    /// Successful metadata writes in order
    pub fn patches(&self) -> Vec<(String, MetadataPatch)> {
        self.behavior().patches.clone()
    }

    /// Every metadata write attempt, including rejected ones
    pub fn update_attempts(&self) -> Vec<String> {
        self.behavior().update_attempts.clone()
    }

    /// Uploaded thumbnails as `(series id, byte count)`
    pub fn thumbnails(&self) -> Vec<(String, usize)> {
        self.behavior().thumbnails.clone()
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    async fn list_series(&self) -> Result<CatalogListing> {
        let behavior = self.behavior();
        if behavior.listing_fails {
            return Err(Error::catalog_listing("mock catalog unavailable"));
        }
        Ok(CatalogListing::new(behavior.entries.clone()))
    }

    async fn update_metadata(&self, series_id: &str, patch: &MetadataPatch) -> Result<()> {
        let mut behavior = self.behavior();
        behavior.update_attempts.push(series_id.to_string());

        if behavior.failing_updates.contains(series_id) {
            return Err(Error::http_status("mock catalog", series_id, 400));
        }
        if let Some(remaining) = behavior.update_failures_remaining.get_mut(series_id)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(Error::http_status("mock catalog", series_id, 500));
        }

        behavior
            .patches
            .push((series_id.to_string(), patch.clone()));
        Ok(())
    }

    async fn upload_thumbnail(&self, series_id: &str, image: Vec<u8>) -> Result<()> {
        let mut behavior = self.behavior();
        if behavior.thumbnail_fails {
            return Err(Error::http_status("mock catalog", series_id, 413));
        }
        behavior
            .thumbnails
            .push((series_id.to_string(), image.len()));
        Ok(())
    }
}
