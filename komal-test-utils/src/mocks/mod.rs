//! Mock implementations for testing

mod catalog;
mod cover;
mod prompter;
mod provider;

pub use catalog::MockCatalog;
pub use cover::MockCoverSource;
pub use prompter::ScriptedPrompter;
pub use provider::MockProvider;
