//! File-backed asset record store

use std::path::{Path, PathBuf};

use tracing::error;

use crate::error::StoreError;
use crate::models::AssetRecord;

pub struct AssetStore {
    path: PathBuf,
}

impl AssetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all records. Missing file reads as empty; a corrupt file is
    /// logged and also reads as empty.
    pub fn load(&self) -> Vec<AssetRecord> {
        if !self.path.exists() {
            return Vec::new();
        }
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) => {
                error!(path = %self.path.display(), error = %err, "failed to read asset store");
                return Vec::new();
            }
        };
        match serde_json::from_str(&content) {
            Ok(assets) => assets,
            Err(err) => {
                error!(path = %self.path.display(), error = %err, "malformed asset store");
                Vec::new()
            }
        }
    }

    pub fn save(&self, assets: &[AssetRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(assets).map_err(|source| StoreError::Encode {
            path: self.path.display().to_string(),
            source,
        })?;
        std::fs::write(&self.path, json).map_err(|source| StoreError::Write {
            path: self.path.display().to_string(),
            source,
        })
    }

    /// Next record ID: one past the current maximum
    pub fn next_id(assets: &[AssetRecord]) -> u64 {
        assets.iter().map(|a| a.id).max().unwrap_or(0) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AssetMetadata;
    use chrono::Utc;

    fn record(id: u64) -> AssetRecord {
        AssetRecord {
            id,
            filename: format!("asset-{id}.jpg"),
            engineer_name: "Jane Doe".to_string(),
            engineer_id: String::new(),
            engineer_category: "field".to_string(),
            asset_id: String::new(),
            asset_name: format!("Asset {id}"),
            asset_number: String::new(),
            serial_number: String::new(),
            purchase_date: String::new(),
            asset_type: String::new(),
            asset_price: "0".to_string(),
            manufacturer: "Unknown".to_string(),
            model_number: "Unknown".to_string(),
            condition: "good".to_string(),
            visual_description: String::new(),
            detailed_description: String::new(),
            category: "Tools".to_string(),
            image_base64: String::new(),
            raw_metadata: AssetMetadata::default(),
            stored_location: "Warehouse".to_string(),
            uploaded_at: Utc::now(),
            updated_at: None,
            salesforce_id: None,
            salesforce_status: None,
            salesforce_error: None,
        }
    }

    #[test]
    fn test_roundtrip_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::new(dir.path().join("assets.json"));

        assert!(store.load().is_empty());

        let assets = vec![record(1), record(2)];
        store.save(&assets).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].asset_name, "Asset 2");
    }

    #[test]
    fn test_corrupt_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(AssetStore::new(path).load().is_empty());
    }

    #[test]
    fn test_next_id() {
        assert_eq!(AssetStore::next_id(&[]), 1);
        assert_eq!(AssetStore::next_id(&[record(1), record(7)]), 8);
    }
}
