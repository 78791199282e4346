//! komal command line interface
//!
//! Configuration, terminal prompting and the reconcile orchestrator that the
//! `komal` binary wires together.

pub mod config;
pub mod error;
pub mod orchestrators;
pub mod output;
pub mod paths;
pub mod prompter;
pub mod terminal;
