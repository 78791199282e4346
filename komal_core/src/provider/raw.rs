//! Raw manga records as returned by the Jikan API
//!
//! Every field the normalizer reads is optional here. Missing or `null`
//! values deserialize to their empty form so the defaulting rules live in one
//! place instead of being repeated at every use site.

use crate::locator::RecordId;
use serde::{Deserialize, Deserializer, Serialize};

/// A manga record from the external provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawManga {
    #[serde(default)]
    pub mal_id: Option<RecordId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub serializations: Vec<NamedResource>,
    #[serde(default)]
    pub images: Option<Images>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<NamedResource>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub themes: Vec<NamedResource>,
}

/// A `{ "name": ... }` entry (genre, theme, magazine)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

impl NamedResource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// Image sets keyed by format
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Images {
    #[serde(default)]
    pub jpg: Option<ImageSet>,
}

/// URLs of one image format in several sizes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSet {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub large_image_url: Option<String>,
}

impl RawManga {
    /// The large JPEG cover, if the record carries one
    pub fn large_cover_url(&self) -> Option<&str> {
        self.images
            .as_ref()
            .and_then(|images| images.jpg.as_ref())
            .and_then(|jpg| jpg.large_image_url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

/// Treat an explicit JSON `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
