//! Test utilities for komal
//!
//! This crate provides mock implementations of the provider, catalog, cover
//! source and prompter capabilities, plus builders for raw provider records.

pub mod builders;
pub mod mocks;

// Re-export commonly used types
pub use builders::RawMangaBuilder;
pub use mocks::{MockCatalog, MockCoverSource, MockProvider, ScriptedPrompter};
