//! Disambiguation and confirmation capability
//!
//! The resolver and orchestrator ask questions through `Prompter`; the CLI
//! answers them on the terminal and tests answer them from a script.

use crate::error::Result;
use crate::normalize::MetadataRecord;
use crate::provider::RawManga;

/// A search result as offered to the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub status: String,
    pub url: String,
}

impl Candidate {
    pub fn from_raw(raw: &RawManga) -> Self {
        let status = if raw.status.is_empty() {
            "Unknown".to_string()
        } else {
            raw.status.clone()
        };

        Self {
            title: raw.title.clone(),
            status,
            url: raw.url.clone(),
        }
    }
}

/// Operator's answer to a disambiguation prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// Index into the offered candidates, zero based
    Candidate(usize),
    /// Leave this entry alone for now
    Skip,
    /// Use this locator instead of any candidate
    Manual(String),
}

/// Blocking operator interaction
pub trait Prompter: Send + Sync {
    /// Pick one of `candidates`, skip, or supply a locator
    fn choose(&self, entry_name: &str, candidates: &[Candidate]) -> Result<Choice>;

    /// Ask whether `record` should be written for `entry_name`
    ///
    /// Anything but an explicit yes must return `Ok(false)`.
    fn confirm_apply(&self, entry_name: &str, record: &MetadataRecord) -> Result<bool>;
}
