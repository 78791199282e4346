//! Builder for raw provider records

use komal_core::provider::raw::{ImageSet, Images, NamedResource};
use komal_core::{RawManga, RecordId, manga_url};

/// Builder for `RawManga` test records
///
/// Starts from a publishing record with a score, one magazine, a cover and
/// canonical URL derived from the id.
pub struct RawMangaBuilder {
    record: RawManga,
}

impl RawMangaBuilder {
    pub fn new(id: RecordId, title: &str) -> Self {
        Self {
            record: RawManga {
                mal_id: Some(id),
                url: format!("{}/{}", manga_url(id), title.replace(' ', "_")),
                title: title.to_string(),
                status: "Publishing".to_string(),
                score: Some(8.5),
                synopsis: Some(format!("Synopsis of {title}.")),
                serializations: vec![NamedResource::new("Weekly Test")],
                images: Some(Images {
                    jpg: Some(ImageSet {
                        image_url: Some(format!("https://cdn.test/{id}.jpg")),
                        large_image_url: Some(format!("https://cdn.test/{id}l.jpg")),
                    }),
                }),
                genres: vec![NamedResource::new("Action")],
                themes: vec![NamedResource::new("Military")],
            },
        }
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.record.status = status.to_string();
        self
    }

    pub fn with_score(mut self, score: Option<f64>) -> Self {
        self.record.score = score;
        self
    }

    pub fn with_synopsis(mut self, synopsis: Option<&str>) -> Self {
        self.record.synopsis = synopsis.map(str::to_string);
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.record.url = url.to_string();
        self
    }

    pub fn with_genres(mut self, genres: &[&str]) -> Self {
        self.record.genres = genres.iter().map(|g| NamedResource::new(g)).collect();
        self
    }

    pub fn with_themes(mut self, themes: &[&str]) -> Self {
        self.record.themes = themes.iter().map(|t| NamedResource::new(t)).collect();
        self
    }

    pub fn without_cover(mut self) -> Self {
        self.record.images = None;
        self
    }

    pub fn build(self) -> RawManga {
        self.record
    }
}
