//! Orchestrators coordinate the core library for individual commands

pub mod reconcile_orchestrator;

pub use reconcile_orchestrator::{
    EntryOutcome, EntryReport, ReconcileOptions, ReconcileOrchestrator, RunReport,
};
