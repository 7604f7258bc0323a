//! Local asset records and history entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ai::AssetMetadata;

/// Outcome of the CRM submission for one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrmStatus {
    Created,
    Skipped,
    Failed,
}

/// One stored asset record. Field names are the on-disk JSON contract the
/// frontend reads; keep them stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: u64,
    pub filename: String,
    pub engineer_name: String,
    #[serde(default)]
    pub engineer_id: String,
    #[serde(default)]
    pub engineer_category: String,
    #[serde(default)]
    pub asset_id: String,
    pub asset_name: String,
    #[serde(default)]
    pub asset_number: String,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub purchase_date: String,
    #[serde(default)]
    pub asset_type: String,
    #[serde(default)]
    pub asset_price: String,
    pub manufacturer: String,
    pub model_number: String,
    pub condition: String,
    pub visual_description: String,
    pub detailed_description: String,
    pub category: String,
    pub image_base64: String,
    pub raw_metadata: AssetMetadata,
    pub stored_location: String,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salesforce_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salesforce_status: Option<CrmStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salesforce_error: Option<String>,
}

/// Fields a PUT may change; everything else on the record is immutable
pub const UPDATABLE_FIELDS: &[&str] = &[
    "asset_name",
    "asset_type",
    "asset_price",
    "manufacturer",
    "model_number",
    "condition",
    "category",
    "visual_description",
    "detailed_description",
];

impl AssetRecord {
    /// Apply a partial update. Unknown keys and non-string values are
    /// ignored; any accepted change stamps `updated_at`.
    pub fn apply_update(&mut self, patch: &Map<String, Value>) -> bool {
        let mut changed = false;
        for key in UPDATABLE_FIELDS {
            if let Some(Value::String(value)) = patch.get(*key) {
                let slot = match *key {
                    "asset_name" => &mut self.asset_name,
                    "asset_type" => &mut self.asset_type,
                    "asset_price" => &mut self.asset_price,
                    "manufacturer" => &mut self.manufacturer,
                    "model_number" => &mut self.model_number,
                    "condition" => &mut self.condition,
                    "category" => &mut self.category,
                    "visual_description" => &mut self.visual_description,
                    "detailed_description" => &mut self.detailed_description,
                    _ => unreachable!(),
                };
                if *slot != *value {
                    *slot = value.clone();
                    changed = true;
                }
            }
        }
        if changed {
            self.updated_at = Some(Utc::now());
        }
        changed
    }
}

/// One audit entry in the history log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub asset_id: u64,
    pub asset_name: String,
    pub asset_code: String,
    pub field: String,
    pub old_value: String,
    pub new_value: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Entry recording the initial stored-location assignment
    pub fn stored_location(seq: usize, asset_id: u64, asset_name: &str, location: &str) -> Self {
        Self {
            id: format!("HIST-{seq}"),
            asset_id,
            asset_name: asset_name.to_string(),
            asset_code: format!("AST-{asset_id:04}"),
            field: "stored_location".to_string(),
            old_value: "—".to_string(),
            new_value: location.to_string(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> AssetRecord {
        AssetRecord {
            id: 1,
            filename: "ladder.jpg".to_string(),
            engineer_name: "Jane Doe".to_string(),
            engineer_id: String::new(),
            engineer_category: "field".to_string(),
            asset_id: String::new(),
            asset_name: "Ladder".to_string(),
            asset_number: String::new(),
            serial_number: String::new(),
            purchase_date: String::new(),
            asset_type: String::new(),
            asset_price: "0".to_string(),
            manufacturer: "Werner".to_string(),
            model_number: "D1228-2".to_string(),
            condition: "good".to_string(),
            visual_description: String::new(),
            detailed_description: String::new(),
            category: "Ladder".to_string(),
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
    fn test_apply_update_touches_only_updatable_fields() {
        let mut asset = record();
        let patch = serde_json::from_value::<Map<String, Value>>(json!({
            "asset_name": "Extension Ladder",
            "condition": "fair",
            "id": 99,
            "engineer_name": "Mallory"
        }))
        .unwrap();

        assert!(asset.apply_update(&patch));
        assert_eq!(asset.asset_name, "Extension Ladder");
        assert_eq!(asset.condition, "fair");
        assert_eq!(asset.id, 1);
        assert_eq!(asset.engineer_name, "Jane Doe");
        assert!(asset.updated_at.is_some());
    }

    #[test]
    fn test_apply_update_without_changes_leaves_timestamp_unset() {
        let mut asset = record();
        let patch = serde_json::from_value::<Map<String, Value>>(json!({
            "condition": "good"
        }))
        .unwrap();
        assert!(!asset.apply_update(&patch));
        assert!(asset.updated_at.is_none());
    }

    #[test]
    fn test_history_entry_codes() {
        let entry = HistoryEntry::stored_location(3, 7, "Pump", "Warehouse A");
        assert_eq!(entry.id, "HIST-3");
        assert_eq!(entry.asset_code, "AST-0007");
        assert_eq!(entry.field, "stored_location");
        assert_eq!(entry.new_value, "Warehouse A");
    }

    #[test]
    fn test_crm_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(CrmStatus::Created).unwrap(),
            json!("created")
        );
        assert_eq!(
            serde_json::to_value(CrmStatus::Failed).unwrap(),
            json!("failed")
        );
    }
}
