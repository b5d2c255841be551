//! Client-side session history store
//!
//! An append-only JSON file of submitted sessions for history display.
//! No deduplication and no client-enforced expiry; the server expires
//! sessions independently, so stale entries simply 404 when revisited.

use crate::models::SessionRecord;
use mdump_common::{Error, Result};
use std::path::{Path, PathBuf};

/// JSON-file-backed session history list
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load all records in append order; a missing file is an empty list
    pub fn load(&self) -> Result<Vec<SessionRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Internal(format!("History file corrupt: {}", e)))
    }

    /// Append one record and write the list back
    pub fn append(&self, record: SessionRecord) -> Result<()> {
        let mut records = self.load()?;
        records.push(record);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&records)
            .map_err(|e| Error::Internal(format!("History serialization failed: {}", e)))?;
        std::fs::write(&self.path, content)?;

        tracing::debug!(
            path = %self.path.display(),
            count = records.len(),
            "Session history updated"
        );
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
