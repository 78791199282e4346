//! Scripted prompter

use komal_core::{Candidate, Choice, MetadataRecord, Prompter, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// `Prompter` that answers from queued responses
///
/// When the script runs out, disambiguation answers skip and confirmation
/// answers no, like a non-interactive terminal.
#[derive(Clone, Default)]
pub struct ScriptedPrompter {
    script: Arc<Mutex<Script>>,
}

#[derive(Default)]
struct Script {
    choices: VecDeque<Choice>,
    confirmations: VecDeque<bool>,
    choose_calls: Vec<(String, Vec<Candidate>)>,
    confirm_calls: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap()
    }

    pub fn push_choice(&self, choice: Choice) -> &Self {
        self.script().choices.push_back(choice);
        self
    }

    pub fn push_confirmation(&self, answer: bool) -> &Self {
        self.script().confirmations.push_back(answer);
        self
    }

    /// Entry names and candidates seen by `choose`
    pub fn choose_calls(&self) -> Vec<(String, Vec<Candidate>)> {
        self.script().choose_calls.clone()
    }

    /// Entry names seen by `confirm_apply`
    pub fn confirm_calls(&self) -> Vec<String> {
        self.script().confirm_calls.clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn choose(&self, entry_name: &str, candidates: &[Candidate]) -> Result<Choice> {
        let mut script = self.script();
        script
            .choose_calls
            .push((entry_name.to_string(), candidates.to_vec()));
        Ok(script.choices.pop_front().unwrap_or(Choice::Skip))
    }

    fn confirm_apply(&self, entry_name: &str, _record: &MetadataRecord) -> Result<bool> {
        let mut script = self.script();
        script.confirm_calls.push(entry_name.to_string());
        Ok(script.confirmations.pop_front().unwrap_or(false))
    }
}
