//! Mock metadata provider

use async_trait::async_trait;
use komal_core::{Error, MetadataProvider, RawManga, RecordId, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock implementation of `MetadataProvider`
///
/// Search answers come from per-query results (falling back to a default
/// list); fetches come from records registered by id. Every call is counted
/// so tests can assert how often the provider was reached.
///
/// ```rust,no_run
/// use komal_test_utils::{MockProvider, RawMangaBuilder};
///
/// let provider = MockProvider::new();
/// provider.add_search_results("Berserk", vec![RawMangaBuilder::new(2, "Berserk").build()]);
/// ```
#[derive(Clone, Default)]
pub struct MockProvider {
    behavior: Arc<Mutex<MockBehavior>>,
}

#[derive(Default)]
struct MockBehavior {
    search_results: HashMap<String, Vec<RawManga>>,
    default_results: Vec<RawManga>,
    records: HashMap<RecordId, RawManga>,
    search_offline: bool,
    fetch_failures_remaining: usize,
    fetch_offline: bool,
    search_queries: Vec<String>,
    fetched_ids: Vec<RecordId>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn behavior(&self) -> std::sync::MutexGuard<'_, MockBehavior> {
        self.behavior.lock().unwrap()
    }

    /// Results for one exact query
    pub fn add_search_results(&self, query: &str, results: Vec<RawManga>) {
        self.behavior()
            .search_results
            .insert(query.to_string(), results);
    }

    /// Results for any query without its own entry
    pub fn set_default_results(&self, results: Vec<RawManga>) {
        self.behavior().default_results = results;
    }

    /// Make a record fetchable by its `mal_id`
    pub fn add_record(&self, record: RawManga) {
        let id = record.mal_id.unwrap_or_default();
        self.behavior().records.insert(id, record);
    }

    /// Every search fails with a transport error
    pub fn set_search_offline(&self, offline: bool) {
        self.behavior().search_offline = offline;
    }

    /// Every fetch fails with a transport error
    pub fn set_fetch_offline(&self, offline: bool) {
        self.behavior().fetch_offline = offline;
    }

    /// The next `count` fetches fail with a transport error
    pub fn fail_next_fetches(&self, count: usize) {
        self.behavior().fetch_failures_remaining = count;
    }

    pub fn search_calls(&self) -> usize {
        self.behavior().search_queries.len()
    }

    pub fn search_queries(&self) -> Vec<String> {
        self.behavior().search_queries.clone()
    }

    pub fn fetch_calls(&self) -> usize {
        self.behavior().fetched_ids.len()
    }

    pub fn fetched_ids(&self) -> Vec<RecordId> {
        self.behavior().fetched_ids.clone()
    }
}

#[async_trait]
impl MetadataProvider for MockProvider {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RawManga>> {
        let mut behavior = self.behavior();
        behavior.search_queries.push(query.to_string());

        if behavior.search_offline {
            return Err(Error::transport("mock provider", "search offline"));
        }

        let mut results = behavior
            .search_results
            .get(query)
            .cloned()
            .unwrap_or_else(|| behavior.default_results.clone());
        results.truncate(limit);
        Ok(results)
    }

    async fn fetch(&self, id: RecordId) -> Result<Option<RawManga>> {
        let mut behavior = self.behavior();
        behavior.fetched_ids.push(id);

        if behavior.fetch_offline {
            return Err(Error::transport("mock provider", "fetch offline"));
        }
        if behavior.fetch_failures_remaining > 0 {
            behavior.fetch_failures_remaining -= 1;
            return Err(Error::http_status("mock provider", "/manga", 503));
        }

        Ok(behavior.records.get(&id).cloned())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
