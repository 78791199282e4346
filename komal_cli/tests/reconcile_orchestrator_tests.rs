//! Reconcile runs against mock catalog, provider, cover source and prompter

use komal_cli::orchestrators::{
    EntryOutcome, ReconcileOptions, ReconcileOrchestrator, RunReport,
};
use komal_core::{
    Choice, IdentifierCache, MemoryCache, MemoryProcessedLog, MetadataResolver, ProcessedLog,
    manga_url,
};
use komal_test_utils::{
    MockCatalog, MockCoverSource, MockProvider, RawMangaBuilder, ScriptedPrompter,
};
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    catalog: MockCatalog,
    provider: MockProvider,
    covers: MockCoverSource,
    prompter: ScriptedPrompter,
    cache: Arc<MemoryCache>,
    processed: Arc<MemoryProcessedLog>,
    options: ReconcileOptions,
}

impl Harness {
    fn new(series: &[(&str, &str)]) -> Self {
        Self {
            catalog: MockCatalog::with_series(series),
            provider: MockProvider::new(),
            covers: MockCoverSource::new(),
            prompter: ScriptedPrompter::new(),
            cache: Arc::new(MemoryCache::new()),
            processed: Arc::new(MemoryProcessedLog::new()),
            options: ReconcileOptions::default(),
        }
    }

    fn with_cache(mut self, cache: MemoryCache) -> Self {
        self.cache = Arc::new(cache);
        self
    }

    fn with_processed(mut self, processed: MemoryProcessedLog) -> Self {
        self.processed = Arc::new(processed);
        self
    }

    async fn run(&self) -> komal_core::Result<RunReport> {
        let resolver = MetadataResolver::new(
            Arc::new(self.provider.clone()),
            self.cache.clone(),
            Arc::new(self.prompter.clone()),
        );
        let orchestrator = ReconcileOrchestrator::new(
            resolver,
            Arc::new(self.catalog.clone()),
            Arc::new(self.covers.clone()),
            self.processed.clone(),
            self.options.clone(),
        );
        orchestrator.run().await
    }
}

fn cached(name: &str, id: u64) -> MemoryCache {
    MemoryCache::with_entries([(name.to_string(), manga_url(id))])
}

#[tokio::test]
async fn test_fresh_selection_end_to_end() {
    let h = Harness::new(&[("0A1", "Title A")]);
    let candidate = RawMangaBuilder::new(101, "Title A").build();
    let url = candidate.url.clone();
    h.provider.add_search_results("Title A", vec![candidate]);
    h.prompter.push_choice(Choice::Candidate(0)).push_confirmation(true);

    let report = h.run().await.unwrap();

    assert_eq!(report.expected, 1);
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].outcome, EntryOutcome::Done);
    assert_eq!(report.entries[0].attempts, 1);
    assert_eq!(report.retried, 0);

    assert_eq!(h.cache.lookup("Title A").await.unwrap(), Some(url));
    assert_eq!(h.cache.entries().await.unwrap().len(), 1);

    let patches = h.catalog.patches();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].0, "0A1");
    assert!(patches[0].1.all_locked());

    assert_eq!(h.processed.ids().await, vec!["0A1".to_string()]);
    assert_eq!(h.catalog.thumbnails(), vec![("0A1".to_string(), 4)]);
    assert_eq!(h.covers.requested(), vec!["https://cdn.test/101l.jpg".to_string()]);
}

#[tokio::test]
async fn test_written_patch_carries_normalized_record() {
    let h = Harness::new(&[("0A1", "Title A")]).with_cache(cached("Title A", 7));
    h.provider.add_record(
        RawMangaBuilder::new(7, "Title A")
            .with_status("Finished")
            .with_score(Some(9.0))
            .with_synopsis(Some("Line one.\nLine two."))
            .build(),
    );

    h.run().await.unwrap();

    let patch = &h.catalog.patches()[0].1;
    assert_eq!(patch.status.as_str(), "ENDED");
    assert_eq!(patch.summary, "⭐ 9.0\nLine one. Line two.");
    assert_eq!(patch.publisher, "Weekly Test");
    assert_eq!(patch.genres, vec!["Action".to_string()]);
    assert_eq!(patch.tags, vec!["Military".to_string()]);
}

#[tokio::test]
async fn test_cached_entry_is_applied_without_prompting() {
    let h = Harness::new(&[("0A1", "Title A")]).with_cache(cached("Title A", 7));
    h.provider.add_record(RawMangaBuilder::new(7, "Title A").build());

    let report = h.run().await.unwrap();

    assert_eq!(report.count(EntryOutcome::Done), 1);
    assert_eq!(h.provider.search_calls(), 0);
    assert!(h.prompter.choose_calls().is_empty());
    assert!(h.prompter.confirm_calls().is_empty());
}

#[tokio::test]
async fn test_entry_failing_twice_is_attempted_exactly_twice() {
    let h = Harness::new(&[("0A1", "Title A")]).with_cache(cached("Title A", 7));
    h.provider.add_record(RawMangaBuilder::new(7, "Title A").build());
    h.catalog.fail_updates_for("0A1");

    let report = h.run().await.unwrap();

    let entry = report.entry("Title A").unwrap();
    assert_eq!(entry.outcome, EntryOutcome::Failed);
    assert_eq!(entry.attempts, 2);
    assert!(entry.error.as_deref().unwrap().contains("400"));
    assert_eq!(h.catalog.update_attempts(), vec!["0A1", "0A1"]);
    assert_eq!(h.provider.fetch_calls(), 2);
    assert_eq!(report.retried, 1);
    assert!(report.has_failures());
    assert!(h.processed.ids().await.is_empty());
}

#[tokio::test]
async fn test_retry_pass_recovers_transient_write_failure() {
    let h = Harness::new(&[("0A1", "Title A"), ("0B2", "Title B")])
        .with_cache(MemoryCache::with_entries([
            ("Title A".to_string(), manga_url(7)),
            ("Title B".to_string(), manga_url(8)),
        ]));
    h.provider.add_record(RawMangaBuilder::new(7, "Title A").build());
    h.provider.add_record(RawMangaBuilder::new(8, "Title B").build());
    h.catalog.fail_next_updates_for("0A1", 1);

    let report = h.run().await.unwrap();

    let entry = report.entry("Title A").unwrap();
    assert_eq!(entry.outcome, EntryOutcome::Done);
    assert_eq!(entry.attempts, 2);
    assert_eq!(entry.error, None);

    // The retry happens after the whole main pass
    assert_eq!(h.catalog.update_attempts(), vec!["0A1", "0B2", "0A1"]);
    assert_eq!(h.processed.ids().await, vec!["0B2", "0A1"]);
}

#[tokio::test]
async fn test_retry_pass_never_prompts() {
    let h = Harness::new(&[("0A1", "Title A")]);
    let candidate = RawMangaBuilder::new(101, "Title A").build();
    h.provider.add_search_results("Title A", vec![candidate.clone()]);
    h.provider.add_record(candidate);
    h.prompter.push_choice(Choice::Candidate(0)).push_confirmation(true);
    h.catalog.fail_next_updates_for("0A1", 1);

    let report = h.run().await.unwrap();

    assert_eq!(report.count(EntryOutcome::Done), 1);
    // The retry reuses the link cached during the main pass
    assert_eq!(h.provider.search_calls(), 1);
    assert_eq!(h.prompter.choose_calls().len(), 1);
    assert_eq!(h.prompter.confirm_calls().len(), 1);
    assert_eq!(h.catalog.patches().len(), 1);
}

#[tokio::test]
async fn test_retry_after_uncached_failure_does_not_prompt() {
    let h = Harness::new(&[("0A1", "Title A")]);
    h.provider
        .add_search_results("Title A", vec![RawMangaBuilder::new(101, "Title A").build()]);
    // Out of range in the main pass; a retry that prompted would take the second
    h.prompter
        .push_choice(Choice::Candidate(7))
        .push_choice(Choice::Candidate(0));

    let report = h.run().await.unwrap();

    let entry = report.entry("Title A").unwrap();
    assert_eq!(entry.outcome, EntryOutcome::Failed);
    assert_eq!(entry.attempts, 2);
    assert!(entry.error.as_deref().unwrap().contains("No cached link"));
    assert_eq!(h.prompter.choose_calls().len(), 1);
    assert!(h.prompter.confirm_calls().is_empty());
    assert_eq!(h.provider.search_calls(), 1);
    assert!(h.cache.entries().await.unwrap().is_empty());
    assert!(h.catalog.update_attempts().is_empty());
}

#[tokio::test]
async fn test_declined_confirmation_is_skipped_and_not_retried() {
    let h = Harness::new(&[("0A1", "Title A")]);
    h.provider
        .add_search_results("Title A", vec![RawMangaBuilder::new(101, "Title A").build()]);
    h.prompter.push_choice(Choice::Candidate(0)).push_confirmation(false);

    let report = h.run().await.unwrap();

    let entry = report.entry("Title A").unwrap();
    assert_eq!(entry.outcome, EntryOutcome::Skipped);
    assert_eq!(entry.attempts, 1);
    assert_eq!(report.retried, 0);
    assert!(h.catalog.update_attempts().is_empty());
    assert_eq!(h.prompter.confirm_calls(), vec!["Title A".to_string()]);
    // Resolution already cached the selection before the decline
    assert!(h.cache.lookup("Title A").await.unwrap().is_some());
}

#[tokio::test]
async fn test_skip_during_disambiguation_leaves_cache_untouched() {
    let h = Harness::new(&[("0A1", "Title A")]);
    h.provider
        .add_search_results("Title A", vec![RawMangaBuilder::new(101, "Title A").build()]);
    h.prompter.push_choice(Choice::Skip);

    let report = h.run().await.unwrap();

    assert_eq!(report.count(EntryOutcome::Skipped), 1);
    assert_eq!(report.retried, 0);
    assert!(h.cache.entries().await.unwrap().is_empty());
    assert!(h.prompter.confirm_calls().is_empty());
    assert!(h.catalog.update_attempts().is_empty());
}

#[tokio::test]
async fn test_manual_link_is_applied_without_confirmation() {
    let h = Harness::new(&[("0A1", "Title A")]);
    h.provider
        .add_search_results("Title A", vec![RawMangaBuilder::new(101, "Title A").build()]);
    h.provider.add_record(RawMangaBuilder::new(55, "Other Title").build());
    h.prompter.push_choice(Choice::Manual(
        "https://myanimelist.net/manga/55/Other_Title".to_string(),
    ));

    let report = h.run().await.unwrap();

    assert_eq!(report.count(EntryOutcome::Done), 1);
    assert!(h.prompter.confirm_calls().is_empty());
    assert_eq!(h.provider.fetched_ids(), vec![55]);
    assert_eq!(h.catalog.patches().len(), 1);
    assert_eq!(
        h.cache.lookup("Title A").await.unwrap().as_deref(),
        Some("https://myanimelist.net/manga/55/Other_Title")
    );
}

#[tokio::test]
async fn test_name_filter_leaves_other_series_alone() {
    let mut h = Harness::new(&[("0A1", "Title A"), ("0B2", "Title B")]);
    h.options.only = vec!["Title B".to_string()];
    h.provider.set_default_results(vec![RawMangaBuilder::new(8, "Title B").build()]);
    h.prompter.push_choice(Choice::Candidate(0)).push_confirmation(true);

    let report = h.run().await.unwrap();

    assert_eq!(report.entry("Title A").unwrap().outcome, EntryOutcome::Filtered);
    assert_eq!(report.entry("Title A").unwrap().attempts, 0);
    assert_eq!(report.entry("Title B").unwrap().outcome, EntryOutcome::Done);
    assert_eq!(h.provider.search_queries(), vec!["Title B".to_string()]);
    assert_eq!(h.cache.entries().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_resume_skips_processed_series() {
    let mut h = Harness::new(&[("0A1", "Title A"), ("0B2", "Title B")])
        .with_cache(MemoryCache::with_entries([
            ("Title A".to_string(), manga_url(7)),
            ("Title B".to_string(), manga_url(8)),
        ]))
        .with_processed(MemoryProcessedLog::with_ids(["0A1"]));
    h.options.resume = true;
    h.provider.add_record(RawMangaBuilder::new(7, "Title A").build());
    h.provider.add_record(RawMangaBuilder::new(8, "Title B").build());

    let report = h.run().await.unwrap();

    assert_eq!(
        report.entry("Title A").unwrap().outcome,
        EntryOutcome::AlreadyProcessed
    );
    assert_eq!(report.entry("Title B").unwrap().outcome, EntryOutcome::Done);
    assert_eq!(h.provider.fetched_ids(), vec![8]);
    assert_eq!(h.processed.len().await, 2);
}

#[tokio::test]
async fn test_processed_log_ignored_without_resume() {
    let h = Harness::new(&[("0A1", "Title A")])
        .with_cache(cached("Title A", 7))
        .with_processed(MemoryProcessedLog::with_ids(["0A1"]));
    h.provider.add_record(RawMangaBuilder::new(7, "Title A").build());

    let report = h.run().await.unwrap();

    assert_eq!(report.count(EntryOutcome::Done), 1);
    assert_eq!(h.catalog.patches().len(), 1);
}

#[tokio::test]
async fn test_cover_failure_does_not_fail_entry() {
    let h = Harness::new(&[("0A1", "Title A")]).with_cache(cached("Title A", 7));
    h.provider.add_record(RawMangaBuilder::new(7, "Title A").build());
    h.covers.set_fails(true);

    let report = h.run().await.unwrap();

    assert_eq!(report.count(EntryOutcome::Done), 1);
    assert_eq!(report.retried, 0);
    assert_eq!(h.catalog.update_attempts().len(), 1);
    assert!(h.catalog.thumbnails().is_empty());
    assert_eq!(h.processed.ids().await, vec!["0A1".to_string()]);
}

#[tokio::test]
async fn test_thumbnail_upload_failure_does_not_fail_entry() {
    let h = Harness::new(&[("0A1", "Title A")]).with_cache(cached("Title A", 7));
    h.provider.add_record(RawMangaBuilder::new(7, "Title A").build());
    h.catalog.set_thumbnail_fails(true);

    let report = h.run().await.unwrap();

    assert_eq!(report.count(EntryOutcome::Done), 1);
    assert_eq!(report.retried, 0);
}

#[tokio::test]
async fn test_record_without_cover_skips_transfer() {
    let h = Harness::new(&[("0A1", "Title A")]).with_cache(cached("Title A", 7));
    h.provider
        .add_record(RawMangaBuilder::new(7, "Title A").without_cover().build());

    let report = h.run().await.unwrap();

    assert_eq!(report.count(EntryOutcome::Done), 1);
    assert!(h.covers.requested().is_empty());
    assert!(h.catalog.thumbnails().is_empty());
}

#[tokio::test]
async fn test_stale_cache_entry_fails_then_retries_from_cache() {
    let h = Harness::new(&[("0A1", "Title A")]).with_cache(cached("Title A", 7));
    h.provider.add_record(RawMangaBuilder::new(7, "Title A").build());
    h.provider.fail_next_fetches(1);

    let report = h.run().await.unwrap();

    let entry = report.entry("Title A").unwrap();
    assert_eq!(entry.outcome, EntryOutcome::Done);
    assert_eq!(entry.attempts, 2);
    assert_eq!(h.provider.search_calls(), 0);
}

#[tokio::test]
async fn test_search_outage_fails_after_retry() {
    let h = Harness::new(&[("0A1", "Title A")]);
    h.provider.set_search_offline(true);

    let report = h.run().await.unwrap();

    let entry = report.entry("Title A").unwrap();
    assert_eq!(entry.outcome, EntryOutcome::Failed);
    assert_eq!(entry.attempts, 2);
    // The retry has no cached link and does not search again
    assert_eq!(h.provider.search_calls(), 1);
    assert!(h.catalog.update_attempts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_delay_follows_every_attempt_in_both_passes() {
    let mut h = Harness::new(&[("0A1", "Title A"), ("0B2", "Title B")])
        .with_cache(MemoryCache::with_entries([
            ("Title A".to_string(), manga_url(7)),
            ("Title B".to_string(), manga_url(8)),
        ]));
    h.options.entry_delay = Duration::from_millis(500);
    h.provider.add_record(RawMangaBuilder::new(7, "Title A").build());
    h.provider.add_record(RawMangaBuilder::new(8, "Title B").build());
    h.catalog.fail_next_updates_for("0B2", 1);

    let started = tokio::time::Instant::now();
    let report = h.run().await.unwrap();

    assert_eq!(report.count(EntryOutcome::Done), 2);
    assert_eq!(report.retried, 1);
    // Two main-pass attempts and one retry
    assert_eq!(started.elapsed(), Duration::from_millis(1500));
}

#[tokio::test(start_paused = true)]
async fn test_filtered_and_processed_entries_are_not_delayed() {
    let mut h = Harness::new(&[("0A1", "Title A"), ("0B2", "Title B"), ("0C3", "Title C")])
        .with_cache(cached("Title C", 9))
        .with_processed(MemoryProcessedLog::with_ids(["0B2"]));
    h.options.only = vec!["Title B".to_string(), "Title C".to_string()];
    h.options.resume = true;
    h.options.entry_delay = Duration::from_millis(500);
    h.provider.add_record(RawMangaBuilder::new(9, "Title C").build());

    let started = tokio::time::Instant::now();
    let report = h.run().await.unwrap();

    assert_eq!(report.entry("Title A").unwrap().outcome, EntryOutcome::Filtered);
    assert_eq!(
        report.entry("Title B").unwrap().outcome,
        EntryOutcome::AlreadyProcessed
    );
    assert_eq!(report.entry("Title C").unwrap().outcome, EntryOutcome::Done);
    assert_eq!(started.elapsed(), Duration::from_millis(500));
}

#[tokio::test]
async fn test_listing_failure_aborts_run() {
    let h = Harness::new(&[("0A1", "Title A")]);
    h.catalog.set_listing_fails(true);

    let error = h.run().await.unwrap_err();

    assert!(error.is_fatal());
    assert_eq!(h.provider.search_calls(), 0);
    assert!(h.catalog.update_attempts().is_empty());
}

#[tokio::test]
async fn test_report_serializes_outcomes_in_snake_case() {
    let mut h = Harness::new(&[("0A1", "Title A")])
        .with_processed(MemoryProcessedLog::with_ids(["0A1"]));
    h.options.resume = true;

    let report = h.run().await.unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["expected"], 1);
    assert_eq!(json["entries"][0]["outcome"], "already_processed");
    assert!(json["entries"][0].get("error").is_none());
}
