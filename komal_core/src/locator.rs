//! Locator parsing
//!
//! A locator is how a catalog entry remembers its MyAnimeList record: usually a
//! URL such as `https://myanimelist.net/manga/2/Berserk`, where the identifier
//! is the second path segment. A bare identifier is accepted as well.

use crate::error::{Error, Result};
use url::Url;

/// Identifier of a record on the external provider
pub type RecordId = u64;

/// Extract the record identifier from a locator
pub fn extract_id(locator: &str) -> Result<RecordId> {
    let trimmed = locator.trim();
    if trimmed.is_empty() {
        return Err(Error::malformed_locator(locator, "locator is empty"));
    }

    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return parse_id(locator, trimmed);
    }

    let url = Url::parse(trimmed)
        .map_err(|e| Error::malformed_locator(locator, format!("not a URL: {e}")))?;

    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).nth(1))
        .ok_or_else(|| Error::malformed_locator(locator, "URL path has no identifier segment"))?;

    parse_id(locator, segment)
}

/// Build the canonical MyAnimeList locator for a manga identifier
pub fn manga_url(id: RecordId) -> String {
    format!("https://myanimelist.net/manga/{id}")
}

fn parse_id(locator: &str, raw: &str) -> Result<RecordId> {
    match raw.parse::<RecordId>() {
        Ok(0) => Err(Error::malformed_locator(locator, "identifier must be positive")),
        Ok(id) => Ok(id),
        Err(_) => Err(Error::malformed_locator(
            locator,
            format!("'{raw}' is not a numeric identifier"),
        )),
    }
}
