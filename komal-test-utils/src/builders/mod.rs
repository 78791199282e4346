//! Builders for test data

mod raw_manga;

pub use raw_manga::RawMangaBuilder;
