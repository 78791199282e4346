//! Human and JSON rendering of reconciliation progress and results

use crate::orchestrators::{EntryOutcome, RunReport};
use anyhow::Result;
use colored::*;
use komal_core::{Candidate, MetadataRecord};

/// Characters of the summary shown in a preview
const PREVIEW_SUMMARY_CHARS: usize = 200;

/// Output format for the run report
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// One line describing a search candidate
pub fn candidate_line(candidate: &Candidate) -> String {
    format!(
        "{} ({}) - {}",
        candidate.title, candidate.status, candidate.url
    )
}

/// `[i/n] name`
pub fn entry_header(index: usize, total: usize, name: &str) -> String {
    format!("[{index}/{total}] {name}")
}

/// Multi-line preview of a record about to be written
pub fn preview(record: &MetadataRecord) -> String {
    let mut lines = vec![
        format!("{} {}", "Status:".bold(), record.status),
        format!(
            "{} {}",
            "Summary:".bold(),
            record.summary_excerpt(PREVIEW_SUMMARY_CHARS)
        ),
        format!("{} {}", "Publisher:".bold(), record.publisher),
        format!("{} {}", "Genres:".bold(), record.genres.join(", ")),
        format!("{} {}", "Tags:".bold(), record.tags.join(", ")),
    ];
    if !record.source_url.is_empty() {
        lines.push(format!("{} {}", "MAL link:".bold(), record.source_url.cyan()));
    }
    lines.join("\n")
}

/// Print the report to stdout in the requested format
pub fn print_report(report: &RunReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Human => print!("{}", human_report(report)),
    }
    Ok(())
}

/// Human summary of a finished run
pub fn human_report(report: &RunReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{}\n", "Summary:".bold().green()));
    output.push_str(&format!("Series listed: {}\n", report.expected));
    output.push_str(&format!(
        "Updated: {}  Skipped: {}  Failed: {}",
        report.count(EntryOutcome::Done),
        report.count(EntryOutcome::Skipped),
        report.count(EntryOutcome::Failed),
    ));

    let filtered = report.count(EntryOutcome::Filtered);
    let already = report.count(EntryOutcome::AlreadyProcessed);
    if filtered > 0 {
        output.push_str(&format!("  Filtered: {filtered}"));
    }
    if already > 0 {
        output.push_str(&format!("  Already processed: {already}"));
    }
    output.push('\n');

    let failed: Vec<_> = report
        .entries
        .iter()
        .filter(|e| e.outcome == EntryOutcome::Failed)
        .collect();
    if !failed.is_empty() {
        output.push_str(&format!("\n{}\n", "Still failing:".bold().red()));
        for entry in failed {
            let reason = entry.error.as_deref().unwrap_or("unknown error");
            output.push_str(&format!("  {} {} ({reason})\n", "✗".red(), entry.name));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use komal_core::SeriesStatus;

    #[test]
    fn test_candidate_line() {
        let candidate = Candidate {
            title: "Berserk".to_string(),
            status: "Publishing".to_string(),
            url: "https://myanimelist.net/manga/2/Berserk".to_string(),
        };
        assert_eq!(
            candidate_line(&candidate),
            "Berserk (Publishing) - https://myanimelist.net/manga/2/Berserk"
        );
    }

    #[test]
    fn test_preview_truncates_summary() {
        colored::control::set_override(false);
        let record = MetadataRecord {
            status: SeriesStatus::Ended,
            summary: "x".repeat(300),
            publisher: "Big Comic".to_string(),
            genres: vec!["Drama".to_string(), "Mystery".to_string()],
            tags: Vec::new(),
            cover_image_url: String::new(),
            source_url: "https://myanimelist.net/manga/1".to_string(),
        };

        let text = preview(&record);
        assert!(text.contains("Status: ENDED"));
        assert!(text.contains(&format!("Summary: {}...", "x".repeat(200))));
        assert!(text.contains("Genres: Drama, Mystery"));
        assert!(text.contains("MAL link: https://myanimelist.net/manga/1"));
    }

    #[test]
    fn test_human_report_lists_failures() {
        use crate::orchestrators::EntryReport;

        colored::control::set_override(false);
        let entry = |name: &str, outcome: EntryOutcome, error: Option<&str>| EntryReport {
            id: format!("id-{name}"),
            name: name.to_string(),
            outcome,
            attempts: 1,
            error: error.map(String::from),
        };
        let report = RunReport {
            expected: 3,
            entries: vec![
                entry("Berserk", EntryOutcome::Done, None),
                entry("Monster", EntryOutcome::Failed, Some("HTTP 500")),
                entry("Vagabond", EntryOutcome::Filtered, None),
            ],
            retried: 1,
        };

        let text = human_report(&report);
        assert!(text.contains("Series listed: 3"));
        assert!(text.contains("Updated: 1  Skipped: 0  Failed: 1"));
        assert!(text.contains("Filtered: 1"));
        assert!(text.contains("Monster (HTTP 500)"));
        assert!(!text.contains("Already processed"));
    }
}
