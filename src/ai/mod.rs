//! Vision-model integration
//!
//! Derives descriptive asset metadata from a photograph via the Groq
//! chat-completions API. Missing credentials and malformed model output
//! both degrade to placeholder metadata; an upload never fails on vision.

pub mod groq;

pub use groq::GroqClient;

use serde::{Deserialize, Serialize};

const DEFAULT_VISION_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Vision client settings, read once at startup
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub api_key: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl VisionConfig {
    /// `None` when no API key is configured
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GROQ_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())?;
        Some(Self {
            api_key,
            model: std::env::var("GROQ_MODEL")
                .unwrap_or_else(|_| DEFAULT_VISION_MODEL.to_string()),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        })
    }
}

/// Descriptive metadata for one photographed asset. Field names follow the
/// JSON contract the model is prompted to return.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AssetMetadata {
    pub asset_name: String,
    pub manufacturer: String,
    pub model_number: String,
    pub condition: String,
    pub category: String,
    pub visual_description: String,
    pub detailed_description: String,
}

impl Default for AssetMetadata {
    fn default() -> Self {
        Self {
            asset_name: "Unknown Asset".to_string(),
            manufacturer: "Unknown".to_string(),
            model_number: "Unknown".to_string(),
            condition: "unknown".to_string(),
            category: "Unknown".to_string(),
            visual_description: "Image analysis unavailable".to_string(),
            detailed_description: "Image analysis not available.".to_string(),
        }
    }
}

impl AssetMetadata {
    /// Placeholder carrying a specific degradation note
    pub fn placeholder(visual: &str, detailed: &str) -> Self {
        Self {
            visual_description: visual.to_string(),
            detailed_description: detailed.to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_parses_model_output() {
        let json = r#"{
            "AssetName": "Extension Ladder",
            "Manufacturer": "Werner",
            "ModelNumber": "D1228-2",
            "Condition": "good",
            "Category": "Ladder",
            "VisualDescription": "Aluminum extension ladder",
            "DetailedDescription": "28-foot aluminum extension ladder."
        }"#;
        let meta: AssetMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.asset_name, "Extension Ladder");
        assert_eq!(meta.category, "Ladder");
    }

    #[test]
    fn test_metadata_tolerates_missing_fields() {
        let meta: AssetMetadata = serde_json::from_str(r#"{"AssetName": "Pump"}"#).unwrap();
        assert_eq!(meta.asset_name, "Pump");
        assert_eq!(meta.manufacturer, "Unknown");
        assert_eq!(meta.condition, "unknown");
    }
}
