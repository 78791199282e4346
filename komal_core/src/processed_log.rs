//! Processed log
//!
//! Append-only record of catalog entry ids whose metadata was written
//! successfully, one id per line. Only consulted when a run resumes.

use crate::error::{Error, Result};
use async_trait::async_trait;
use log::{debug, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

const STORE_NAME: &str = "processed log";

/// Append-only set of processed catalog entry ids
#[async_trait]
pub trait ProcessedLog: Send + Sync {
    /// Whether `id` was recorded by this or an earlier run
    async fn contains(&self, id: &str) -> bool;

    /// Record `id`, persisting before returning
    async fn append(&self, id: &str) -> Result<()>;

    /// Number of recorded ids
    async fn len(&self) -> usize;
}

/// Processed log backed by a text file
pub struct FileProcessedLog {
    path: PathBuf,
    ids: RwLock<HashSet<String>>,
}

impl FileProcessedLog {
    /// Open the log at `path`, reading any ids already recorded
    ///
    /// A missing file is an empty log.
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::persistence(
                    STORE_NAME,
                    format!("failed to create {}: {e}", parent.display()),
                )
            })?;
        }

        let ids = Self::load(&path);
        debug!("Loaded {} processed id(s) from {}", ids.len(), path.display());

        Ok(Self {
            path,
            ids: RwLock::new(ids),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> HashSet<String> {
        match std::fs::read_to_string(path) {
            Ok(data) => data
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No processed log at {}; starting fresh", path.display());
                HashSet::new()
            }
            Err(e) => {
                warn!(
                    "Failed to read processed log {}: {e}; starting fresh",
                    path.display()
                );
                HashSet::new()
            }
        }
    }
}

#[async_trait]
impl ProcessedLog for FileProcessedLog {
    async fn contains(&self, id: &str) -> bool {
        self.ids.read().await.contains(id)
    }

    async fn append(&self, id: &str) -> Result<()> {
        let mut ids = self.ids.write().await;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                Error::persistence(
                    STORE_NAME,
                    format!("failed to open {}: {e}", self.path.display()),
                )
            })?;

        file.write_all(format!("{id}\n").as_bytes())
            .await
            .map_err(|e| Error::persistence(STORE_NAME, format!("failed to append: {e}")))?;
        file.flush()
            .await
            .map_err(|e| Error::persistence(STORE_NAME, format!("failed to flush: {e}")))?;

        ids.insert(id.to_string());
        Ok(())
    }

    async fn len(&self) -> usize {
        self.ids.read().await.len()
    }
}

/// In-memory processed log that remembers appends in order
#[derive(Default)]
pub struct MemoryProcessedLog {
    ids: RwLock<Vec<String>>,
}

impl MemoryProcessedLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log that already holds `ids`
    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: RwLock::new(ids.into_iter().map(Into::into).collect()),
        }
    }

    /// Recorded ids in append order
    pub async fn ids(&self) -> Vec<String> {
        self.ids.read().await.clone()
    }
}

#[async_trait]
impl ProcessedLog for MemoryProcessedLog {
    async fn contains(&self, id: &str) -> bool {
        self.ids.read().await.iter().any(|known| known == id)
    }

    async fn append(&self, id: &str) -> Result<()> {
        self.ids.write().await.push(id.to_string());
        Ok(())
    }

    async fn len(&self) -> usize {
        self.ids.read().await.len()
    }
}

/// Processed log used when progress keeping is disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpProcessedLog;

#[async_trait]
impl ProcessedLog for NoOpProcessedLog {
    async fn contains(&self, _id: &str) -> bool {
        false
    }

    async fn append(&self, _id: &str) -> Result<()> {
        Ok(())
    }

    async fn len(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_log_appends_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("series.progress");
        let log = FileProcessedLog::open(path.clone()).unwrap();

        log.append("0A1B").await.unwrap();
        log.append("0C2D").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0A1B\n0C2D\n");
        assert!(log.contains("0A1B").await);
        assert!(!log.contains("0E3F").await);
    }

    #[tokio::test]
    async fn test_file_log_reads_existing_ids() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("series.progress");
        std::fs::write(&path, "0A1B\n\n  0C2D  \n").unwrap();

        let log = FileProcessedLog::open(path).unwrap();
        assert_eq!(log.len().await, 2);
        assert!(log.contains("0C2D").await);
    }

    #[tokio::test]
    async fn test_file_log_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let log = FileProcessedLog::open(temp_dir.path().join("none.progress")).unwrap();
        assert_eq!(log.len().await, 0);
    }

    #[tokio::test]
    async fn test_noop_log_records_nothing() {
        let log = NoOpProcessedLog;
        log.append("0A1B").await.unwrap();
        assert!(!log.contains("0A1B").await);
    }
}
