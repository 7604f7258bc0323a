//! Process configuration
//!
//! All configuration is read from the environment once at startup and held
//! as explicit immutable values. The resolution and mapping core never reads
//! ambient process state; it receives its configuration as arguments.

use std::path::PathBuf;

use crate::ai::VisionConfig;
use crate::salesforce::{EngineerMappingConfig, SalesforceConfig};

/// Immutable application configuration assembled from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub salesforce: SalesforceConfig,
    pub engineer_mapping: EngineerMappingConfig,
    /// `None` when no vision API key is configured; uploads degrade to
    /// placeholder metadata.
    pub vision: Option<VisionConfig>,
    pub assets_file: PathBuf,
    pub history_file: PathBuf,
    /// Default stored-location label written into every new record
    pub storage_location: String,
    /// Account used when the caller supplies neither account nor contact
    pub default_account_id: Option<String>,
    pub frontend_url: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            salesforce: SalesforceConfig::from_env(),
            engineer_mapping: EngineerMappingConfig::from_env(),
            vision: VisionConfig::from_env(),
            assets_file: env_or("ASSETS_FILE", "assets_storage.json").into(),
            history_file: env_or("ASSET_HISTORY_FILE", "asset_history.json").into(),
            storage_location: env_or("COMPANY_STORAGE_LOCATION", "Warehouse Warehouse"),
            default_account_id: env_opt("DEFAULT_ASSET_ACCOUNT_ID"),
            frontend_url: env_or("FRONTEND_URL", "http://localhost:5173"),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
        }
    }
}

/// Environment variable with a default
pub(crate) fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Environment variable as an optional value; unset, empty, and
/// whitespace-only all read as `None`
pub(crate) fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Boolean environment flag accepting `1`, `true`, and `yes`
pub(crate) fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}
