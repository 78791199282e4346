//! Metadata resolution
//!
//! Turns a catalog entry name into a normalized [`MetadataRecord`]. A cached
//! locator is used when one exists; otherwise the provider is searched and the
//! operator picks a candidate, skips, or types a locator. Fresh matches are
//! written back to the identifier cache.

use crate::cache::IdentifierCache;
use crate::error::{Error, Result};
use crate::locator::{self, RecordId};
use crate::normalize::{MetadataRecord, normalize};
use crate::prompt::{Candidate, Choice, Prompter};
use crate::provider::{MetadataProvider, RawManga};
use log::{debug, info, warn};
use std::sync::Arc;

/// Tunables for the fresh-search path
#[derive(Debug, Clone, Copy)]
pub struct ResolverOptions {
    /// Candidates requested from the provider
    pub search_limit: usize,
    /// Candidates shown to the operator
    pub offered: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            search_limit: 5,
            offered: 3,
        }
    }
}

/// Where a resolved record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// A locator already in the identifier cache
    Cached,
    /// A search candidate picked by the operator
    Selected,
    /// A locator typed in by the operator
    Manual,
}

impl Provenance {
    /// Only a picked search candidate is confirmed before writing
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, Self::Selected)
    }
}

/// Whether a resolution may ask the operator anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Search and let the operator pick on a cache miss
    Prompt,
    /// Use cached links only; a miss fails without searching
    Unattended,
}

/// Outcome of resolving one entry name
#[derive(Debug)]
pub enum Resolution {
    Resolved {
        record: MetadataRecord,
        provenance: Provenance,
    },
    /// The operator chose to skip; nothing was cached
    Skipped,
    Failed {
        from_cache: bool,
        error: Error,
    },
}

impl Resolution {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }

    pub fn was_from_cache(&self) -> bool {
        match self {
            Self::Resolved { provenance, .. } => *provenance == Provenance::Cached,
            Self::Failed { from_cache, .. } => *from_cache,
            Self::Skipped => false,
        }
    }

    pub fn record(&self) -> Option<&MetadataRecord> {
        match self {
            Self::Resolved { record, .. } => Some(record),
            _ => None,
        }
    }

    fn fresh_failure(error: Error) -> Self {
        Self::Failed {
            from_cache: false,
            error,
        }
    }
}

/// Resolves entry names against the provider, the cache and the operator
pub struct MetadataResolver {
    provider: Arc<dyn MetadataProvider>,
    cache: Arc<dyn IdentifierCache>,
    prompter: Arc<dyn Prompter>,
    options: ResolverOptions,
}

impl MetadataResolver {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        cache: Arc<dyn IdentifierCache>,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        Self {
            provider,
            cache,
            prompter,
            options: ResolverOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ResolverOptions {
        self.options
    }

    /// The prompter shared with the orchestrator for confirmations
    pub fn prompter(&self) -> &Arc<dyn Prompter> {
        &self.prompter
    }

    /// Resolve `name` to a normalized record
    ///
    /// Never returns an error directly; every failure is a
    /// [`Resolution::Failed`] so the caller can classify the entry.
    pub async fn resolve(&self, name: &str) -> Resolution {
        self.resolve_with(name, Interaction::Prompt).await
    }

    /// Resolve `name`, prompting on a cache miss only when `interaction` allows
    pub async fn resolve_with(&self, name: &str, interaction: Interaction) -> Resolution {
        if let Some(id) = self.cached_id(name).await {
            return self.resolve_cached(name, id).await;
        }

        match interaction {
            Interaction::Prompt => self.resolve_fresh(name).await,
            Interaction::Unattended => {
                debug!("No usable cached link for {name:?}; not prompting");
                Resolution::fresh_failure(Error::not_cached(name))
            }
        }
    }

    /// Identifier from the cache, or `None` on a miss of any kind
    async fn cached_id(&self, name: &str) -> Option<RecordId> {
        let cached = match self.cache.lookup(name).await {
            Ok(cached) => cached?,
            Err(e) => {
                warn!("Identifier cache lookup for {name:?} failed: {e}; searching instead");
                return None;
            }
        };

        match locator::extract_id(&cached) {
            Ok(id) => {
                info!("Using cached link for {name:?}: {cached}");
                Some(id)
            }
            Err(e) => {
                warn!("Ignoring cached link for {name:?}: {e}");
                None
            }
        }
    }

    /// A stale cache entry is reported, never repaired by searching
    async fn resolve_cached(&self, name: &str, id: RecordId) -> Resolution {
        match self.fetch_record(id).await {
            Ok(raw) => Resolution::Resolved {
                record: normalize(&raw),
                provenance: Provenance::Cached,
            },
            Err(error) => {
                warn!("Cached record {id} for {name:?} could not be fetched: {error}");
                Resolution::Failed {
                    from_cache: true,
                    error,
                }
            }
        }
    }

    async fn resolve_fresh(&self, name: &str) -> Resolution {
        debug!("Searching {} for {name:?}", self.provider.name());

        let mut results = match self.provider.search(name, self.options.search_limit).await {
            Ok(results) => results,
            Err(error) => return Resolution::fresh_failure(error),
        };

        if results.is_empty() {
            return Resolution::fresh_failure(Error::not_found(format!("search {name:?}")));
        }

        results.truncate(self.options.offered.max(1));
        let candidates: Vec<Candidate> = results.iter().map(Candidate::from_raw).collect();

        let choice = match self.prompter.choose(name, &candidates) {
            Ok(choice) => choice,
            Err(error) => return Resolution::fresh_failure(error),
        };

        match choice {
            Choice::Skip => {
                debug!("Operator skipped {name:?}");
                Resolution::Skipped
            }
            Choice::Candidate(index) => self.accept_candidate(name, results, index).await,
            Choice::Manual(locator) => self.accept_manual(name, &locator).await,
        }
    }

    async fn accept_candidate(
        &self,
        name: &str,
        results: Vec<RawManga>,
        index: usize,
    ) -> Resolution {
        let offered = results.len();
        let Some(selected) = results.into_iter().nth(index) else {
            return Resolution::fresh_failure(Error::InvalidChoice { index, offered });
        };

        let link = match candidate_link(&selected) {
            Ok(link) => link,
            Err(error) => return Resolution::fresh_failure(error),
        };

        if let Err(error) = self.cache.store(name, &link).await {
            return Resolution::fresh_failure(error);
        }

        Resolution::Resolved {
            record: normalize(&selected),
            provenance: Provenance::Selected,
        }
    }

    async fn accept_manual(&self, name: &str, locator: &str) -> Resolution {
        let locator = locator.trim();
        let id = match locator::extract_id(locator) {
            Ok(id) => id,
            Err(error) => return Resolution::fresh_failure(error),
        };

        if let Err(error) = self.cache.store(name, locator).await {
            return Resolution::fresh_failure(error);
        }

        match self.fetch_record(id).await {
            Ok(raw) => Resolution::Resolved {
                record: normalize(&raw),
                provenance: Provenance::Manual,
            },
            Err(error) => Resolution::fresh_failure(error),
        }
    }

    async fn fetch_record(&self, id: RecordId) -> Result<RawManga> {
        self.provider
            .fetch(id)
            .await?
            .ok_or_else(|| Error::not_found(locator::manga_url(id)))
    }
}

/// Locator to cache for a picked candidate
///
/// The record's own URL when it parses, else the canonical URL for its id.
fn candidate_link(selected: &RawManga) -> Result<String> {
    if locator::extract_id(&selected.url).is_ok() {
        return Ok(selected.url.clone());
    }

    match selected.mal_id {
        Some(id) => {
            debug!("Candidate URL {:?} unusable; caching {}", selected.url, id);
            Ok(locator::manga_url(id))
        }
        None => Err(Error::malformed_locator(
            &selected.url,
            "candidate has neither a usable URL nor an id",
        )),
    }
}
