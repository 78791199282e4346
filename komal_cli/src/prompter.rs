//! Terminal implementation of the operator prompts

use crate::output;
use crate::terminal;
use dialoguer::{Confirm, Input, Select};
use komal_core::{Candidate, Choice, Error, MetadataRecord, Prompter, Result};
use log::debug;

/// Asks the operator on the terminal with `dialoguer`
///
/// Without an interactive terminal every question is declined: disambiguation
/// answers skip and confirmation answers no.
pub struct TerminalPrompter {
    interactive: bool,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            interactive: terminal::is_interactive(),
        }
    }

    /// Prompter that never asks; used for non-interactive runs
    pub fn declining() -> Self {
        Self { interactive: false }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn choose(&self, entry_name: &str, candidates: &[Candidate]) -> Result<Choice> {
        if !self.interactive {
            debug!("Not interactive; skipping disambiguation for {entry_name:?}");
            return Ok(Choice::Skip);
        }

        let mut items: Vec<String> = candidates.iter().map(output::candidate_line).collect();
        let manual_index = items.len();
        items.push("Enter your own MAL link".to_string());
        items.push("Skip this entry".to_string());

        let selection = Select::new()
            .with_prompt(format!("Select a manga for \"{entry_name}\""))
            .items(&items)
            .default(0)
            .interact_opt()
            .map_err(|e| Error::prompt(e.to_string()))?;

        match selection {
            Some(index) if index < manual_index => Ok(Choice::Candidate(index)),
            Some(index) if index == manual_index => {
                let locator: String = Input::new()
                    .with_prompt("Paste your MAL manga URL")
                    .interact_text()
                    .map_err(|e| Error::prompt(e.to_string()))?;
                Ok(Choice::Manual(locator))
            }
            // Skip entry, Esc or q
            _ => Ok(Choice::Skip),
        }
    }

    fn confirm_apply(&self, entry_name: &str, _record: &MetadataRecord) -> Result<bool> {
        if !self.interactive {
            debug!("Not interactive; declining to apply {entry_name:?}");
            return Ok(false);
        }

        Confirm::new()
            .with_prompt("Use this metadata?")
            .default(false)
            .interact()
            .map_err(|e| Error::prompt(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use komal_core::SeriesStatus;

    #[test]
    fn test_declining_prompter_skips_and_refuses() {
        let prompter = TerminalPrompter::declining();
        let candidates = vec![Candidate {
            title: "Berserk".to_string(),
            status: "Publishing".to_string(),
            url: "https://myanimelist.net/manga/2/Berserk".to_string(),
        }];

        assert_eq!(
            prompter.choose("Berserk", &candidates).unwrap(),
            Choice::Skip
        );

        let record = MetadataRecord {
            status: SeriesStatus::Ongoing,
            summary: String::new(),
            publisher: String::new(),
            genres: Vec::new(),
            tags: Vec::new(),
            cover_image_url: String::new(),
            source_url: String::new(),
        };
        assert!(!prompter.confirm_apply("Berserk", &record).unwrap());
    }
}
