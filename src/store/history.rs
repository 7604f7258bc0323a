//! File-backed history log

use std::path::{Path, PathBuf};

use tracing::error;

use crate::error::StoreError;
use crate::models::HistoryEntry;

pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Vec<HistoryEntry> {
        if !self.path.exists() {
            return Vec::new();
        }
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) => {
                error!(path = %self.path.display(), error = %err, "failed to read history log");
                return Vec::new();
            }
        };
        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(err) => {
                error!(path = %self.path.display(), error = %err, "malformed history log");
                Vec::new()
            }
        }
    }

    pub fn save(&self, entries: &[HistoryEntry]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(entries).map_err(|source| StoreError::Encode {
            path: self.path.display().to_string(),
            source,
        })?;
        std::fs::write(&self.path, json).map_err(|source| StoreError::Write {
            path: self.path.display().to_string(),
            source,
        })
    }

    /// Load, append, save
    pub fn append(&self, entry: HistoryEntry) -> Result<(), StoreError> {
        let mut entries = self.load();
        entries.push(entry);
        self.save(&entries)
    }

    /// Sequence number for the next entry (1-based)
    pub fn next_seq(&self) -> usize {
        self.load().len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.json"));

        assert_eq!(log.next_seq(), 1);
        log.append(HistoryEntry::stored_location(1, 1, "Ladder", "Warehouse"))
            .unwrap();
        log.append(HistoryEntry::stored_location(2, 2, "Pump", "Warehouse"))
            .unwrap();

        let entries = log.load();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "HIST-1");
        assert_eq!(entries[1].asset_code, "AST-0002");
        assert_eq!(log.next_seq(), 3);
    }
}
