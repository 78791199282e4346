//! Identifier cache
//!
//! Remembers which MyAnimeList record a catalog entry was matched to, keyed by
//! the entry's display name, so later runs skip search and disambiguation.

pub mod file_cache;
pub mod memory_cache;
pub mod traits;

pub use file_cache::FileCache;
pub use memory_cache::MemoryCache;
pub use traits::IdentifierCache;
