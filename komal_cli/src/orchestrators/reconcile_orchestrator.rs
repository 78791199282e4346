//! Reconcile command orchestrator
//!
//! Walks the catalog listing once, resolving, confirming and writing metadata
//! for each series, then retries the series that failed. Every per-series
//! error ends as a terminal outcome for that series; only listing the catalog
//! can fail the whole run.

use crate::output;
use colored::*;
use komal_core::{
    Catalog, CatalogEntry, CoverSource, CoverTransfer, Interaction, MetadataPatch,
    MetadataRecord, MetadataResolver, ProcessedLog, Provenance, Resolution, transfer_cover,
};
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Options for a reconcile run
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Only process series with these exact names; empty means all
    pub only: Vec<String>,
    /// Skip series already recorded in the processed log
    pub resume: bool,
    /// Pause after every processed series
    pub entry_delay: Duration,
}

/// Terminal state of one series for this run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOutcome {
    /// Metadata written
    Done,
    /// The operator skipped or declined
    Skipped,
    /// Failed in the main pass and again in the retry pass
    Failed,
    /// Not in the name filter
    Filtered,
    /// Recorded in the processed log by an earlier run
    AlreadyProcessed,
}

/// What happened to one series
#[derive(Debug, Clone, Serialize)]
pub struct EntryReport {
    pub id: String,
    pub name: String,
    pub outcome: EntryOutcome,
    /// Resolution attempts made for this series
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a whole run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Series count reported by the catalog
    pub expected: usize,
    pub entries: Vec<EntryReport>,
    /// Series that went through the retry pass
    pub retried: usize,
}

impl RunReport {
    pub fn count(&self, outcome: EntryOutcome) -> usize {
        self.entries.iter().filter(|e| e.outcome == outcome).count()
    }

    pub fn entry(&self, name: &str) -> Option<&EntryReport> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn has_failures(&self) -> bool {
        self.count(EntryOutcome::Failed) > 0
    }
}

/// Result of one attempt at a series
struct Attempt {
    outcome: EntryOutcome,
    error: Option<String>,
}

impl Attempt {
    fn done() -> Self {
        Self {
            outcome: EntryOutcome::Done,
            error: None,
        }
    }

    fn skipped() -> Self {
        Self {
            outcome: EntryOutcome::Skipped,
            error: None,
        }
    }

    fn failed(error: impl ToString) -> Self {
        Self {
            outcome: EntryOutcome::Failed,
            error: Some(error.to_string()),
        }
    }
}

/// Which pass an attempt belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Main,
    Retry,
}

impl Pass {
    /// The retry pass never asks the operator anything
    fn interaction(self) -> Interaction {
        match self {
            Self::Main => Interaction::Prompt,
            Self::Retry => Interaction::Unattended,
        }
    }
}

/// Orchestrator for the run command
pub struct ReconcileOrchestrator {
    resolver: MetadataResolver,
    catalog: Arc<dyn Catalog>,
    covers: Arc<dyn CoverSource>,
    processed: Arc<dyn ProcessedLog>,
    options: ReconcileOptions,
}

impl ReconcileOrchestrator {
    pub fn new(
        resolver: MetadataResolver,
        catalog: Arc<dyn Catalog>,
        covers: Arc<dyn CoverSource>,
        processed: Arc<dyn ProcessedLog>,
        options: ReconcileOptions,
    ) -> Self {
        Self {
            resolver,
            catalog,
            covers,
            processed,
            options,
        }
    }

    /// Run the main pass and the retry pass
    ///
    /// Fails only when the catalog cannot be listed.
    pub async fn run(&self) -> komal_core::Result<RunReport> {
        let listing = self.catalog.list_series().await?;
        let expected = listing.expected();

        eprintln!(
            "{} {}",
            "Series to update:".bold(),
            expected.to_string().cyan()
        );

        let mut report = RunReport {
            expected,
            ..Default::default()
        };
        let mut failed = Vec::new();

        for (idx, entry) in listing.content.iter().enumerate() {
            eprintln!();
            eprintln!("{}", output::entry_header(idx + 1, expected, &entry.name).bold());

            if let Some(outcome) = self.precheck(entry).await {
                report.entries.push(EntryReport {
                    id: entry.id.clone(),
                    name: entry.name.clone(),
                    outcome,
                    attempts: 0,
                    error: None,
                });
                continue;
            }

            let attempt = self.attempt(entry, Pass::Main).await;
            if attempt.outcome == EntryOutcome::Failed {
                failed.push(report.entries.len());
            }
            report.entries.push(EntryReport {
                id: entry.id.clone(),
                name: entry.name.clone(),
                outcome: attempt.outcome,
                attempts: 1,
                error: attempt.error,
            });

            self.pause().await;
        }

        if !failed.is_empty() {
            eprintln!();
            eprintln!("{}", "Retrying failed updates...".bold().cyan());
        }

        for index in failed {
            let entry = CatalogEntry::new(
                report.entries[index].id.clone(),
                report.entries[index].name.clone(),
            );
            eprintln!();
            eprintln!("{} {}", "Retry:".bold(), entry.name);

            let attempt = self.attempt(&entry, Pass::Retry).await;
            match attempt.outcome {
                EntryOutcome::Done => {
                    eprintln!("{} Retry successful: {}", "✓".green(), entry.name)
                }
                EntryOutcome::Failed => {
                    eprintln!("{} Still failed: {}", "✗".red(), entry.name)
                }
                _ => {}
            }

            let slot = &mut report.entries[index];
            slot.attempts += 1;
            slot.outcome = attempt.outcome;
            slot.error = attempt.error;
            report.retried += 1;

            self.pause().await;
        }

        info!(
            "Run finished: {} done, {} skipped, {} failed",
            report.count(EntryOutcome::Done),
            report.count(EntryOutcome::Skipped),
            report.count(EntryOutcome::Failed)
        );

        Ok(report)
    }

    /// Outcome for series that are not processed at all
    async fn precheck(&self, entry: &CatalogEntry) -> Option<EntryOutcome> {
        if !self.options.only.is_empty() && !self.options.only.contains(&entry.name) {
            debug!("{:?} is not in the name filter", entry.name);
            eprintln!("{}", "Not selected; skipping.".dimmed());
            return Some(EntryOutcome::Filtered);
        }

        if self.options.resume && self.processed.contains(&entry.id).await {
            eprintln!("{}", "Already processed; skipping.".dimmed());
            return Some(EntryOutcome::AlreadyProcessed);
        }

        None
    }

    /// Resolve, confirm when needed, and apply one series
    async fn attempt(&self, entry: &CatalogEntry, pass: Pass) -> Attempt {
        let resolution = self
            .resolver
            .resolve_with(&entry.name, pass.interaction())
            .await;
        let (record, provenance) = match resolution {
            Resolution::Resolved { record, provenance } => (record, provenance),
            Resolution::Skipped => {
                eprintln!("{} Skipped.", "⏭".yellow());
                return Attempt::skipped();
            }
            Resolution::Failed { from_cache, error } => {
                let origin = if from_cache { " (cached link)" } else { "" };
                eprintln!("{} No valid metadata{origin}: {error}", "✗".red());
                return Attempt::failed(error);
            }
        };

        eprintln!("{}", "Metadata preview:".bold());
        eprintln!("{}", output::preview(&record));

        match provenance {
            Provenance::Cached => {
                eprintln!("{} Using cached MAL metadata without prompt.", "✓".green())
            }
            Provenance::Manual => {
                eprintln!("{} Using manual MAL link without prompt.", "✓".green())
            }
            Provenance::Selected => {}
        }

        if pass == Pass::Main && provenance.requires_confirmation() {
            let confirmed = match self.resolver.prompter().confirm_apply(&entry.name, &record) {
                Ok(confirmed) => confirmed,
                Err(e) => {
                    warn!("Confirmation prompt failed for {:?}: {e}", entry.name);
                    false
                }
            };
            if !confirmed {
                eprintln!("{} Skipped.", "⏭".yellow());
                return Attempt::skipped();
            }
        }

        self.apply(entry, &record).await
    }

    async fn apply(&self, entry: &CatalogEntry, record: &MetadataRecord) -> Attempt {
        let patch = MetadataPatch::locked(record);

        if let Err(e) = self.catalog.update_metadata(&entry.id, &patch).await {
            eprintln!("{} Metadata update failed: {e}", "✗".red());
            return Attempt::failed(e);
        }
        eprintln!("{} Metadata updated.", "✓".green());

        if let Err(e) = self.processed.append(&entry.id).await {
            warn!("Could not record {} as processed: {e}", entry.id);
        }

        match transfer_cover(
            self.covers.as_ref(),
            self.catalog.as_ref(),
            &entry.id,
            &record.cover_image_url,
        )
        .await
        {
            Ok(CoverTransfer::Uploaded) => eprintln!("{} Cover updated.", "✓".green()),
            Ok(CoverTransfer::NoCover) => debug!("{:?} has no cover image", entry.name),
            Err(e) => {
                warn!("Cover transfer for {:?} failed: {e}", entry.name);
                eprintln!("{} Cover update failed: {e}", "⚠".yellow());
            }
        }

        Attempt::done()
    }

    async fn pause(&self) {
        if !self.options.entry_delay.is_zero() {
            tokio::time::sleep(self.options.entry_delay).await;
        }
    }
}
