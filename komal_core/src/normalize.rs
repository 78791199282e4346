//! Normalization of raw provider records into Komga series metadata

use crate::provider::RawManga;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker placed in front of the synopsis when the record has a score
pub const RATING_MARKER: &str = "⭐";

/// Series status in Komga's vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeriesStatus {
    Ongoing,
    Ended,
    Abandoned,
}

impl SeriesStatus {
    /// Classify free-form provider status text
    ///
    /// Anything that is neither publishing nor finished, including an empty
    /// string, lands in `Abandoned`.
    pub fn classify(raw: &str) -> Self {
        let raw = raw.to_lowercase();
        if raw.contains("publishing") {
            Self::Ongoing
        } else if raw.contains("finished") {
            Self::Ended
        } else {
            Self::Abandoned
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ongoing => "ONGOING",
            Self::Ended => "ENDED",
            Self::Abandoned => "ABANDONED",
        }
    }
}

impl fmt::Display for SeriesStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized metadata ready to be written to the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub status: SeriesStatus,
    pub summary: String,
    pub publisher: String,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub cover_image_url: String,
    pub source_url: String,
}

impl MetadataRecord {
    /// The summary shortened to `max_chars` characters, for previews
    pub fn summary_excerpt(&self, max_chars: usize) -> String {
        match self.summary.char_indices().nth(max_chars) {
            Some((cut, _)) => format!("{}...", &self.summary[..cut]),
            None => self.summary.clone(),
        }
    }
}

/// Normalize a raw record; never fails
pub fn normalize(raw: &RawManga) -> MetadataRecord {
    MetadataRecord {
        status: SeriesStatus::classify(&raw.status),
        summary: build_summary(raw.score, raw.synopsis.as_deref()),
        publisher: raw
            .serializations
            .first()
            .map(|s| s.name.clone())
            .unwrap_or_default(),
        genres: raw.genres.iter().map(|g| g.name.clone()).collect(),
        tags: raw.themes.iter().map(|t| t.name.clone()).collect(),
        cover_image_url: raw.large_cover_url().unwrap_or_default().to_string(),
        source_url: raw.url.clone(),
    }
}

fn build_summary(score: Option<f64>, synopsis: Option<&str>) -> String {
    let synopsis = synopsis
        .unwrap_or_default()
        .replace("\r\n", " ")
        .replace('\n', " ");

    match score.filter(|s| *s != 0.0 && s.is_finite()) {
        Some(score) => format!("{RATING_MARKER} {}\n{synopsis}", format_score(score)),
        None => synopsis,
    }
}

fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.1}")
    } else {
        score.to_string()
    }
}
