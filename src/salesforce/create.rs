//! Asset record creation pipeline
//!
//! Orchestrates schema introspection, engineer identity resolution, payload
//! merge, and submission. Degradation policy: a failed describe falls back
//! to submitting the caller-supplied payload unfiltered; an unresolved
//! identity is informational; only the create call itself fails the
//! operation.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use super::mapping;
use super::resolver::{resolve_user, ResolutionResult, UserLookup};
use super::schema::{FieldMeta, SchemaDescription};
use super::types::{is_account_id, is_contact_id, looks_like_record_id};
use super::EngineerMappingConfig;
use crate::error::SalesforceError;

/// The sobject type asset records are created as
pub const ASSET_OBJECT: &str = "Asset";

/// Salesforce caps Asset.Description at 32k characters
const MAX_DESCRIPTION_LEN: usize = 32_000;

/// The CRM seam the creation pipeline runs against. Production uses the
/// connected REST client; tests substitute fixtures.
#[async_trait]
pub trait CrmApi: UserLookup {
    async fn describe_fields(&self, object_type: &str) -> Result<Vec<FieldMeta>, SalesforceError>;
    async fn create_record(
        &self,
        object_type: &str,
        fields: &Map<String, Value>,
    ) -> Result<String, SalesforceError>;
}

/// Caller-supplied data for one asset creation
#[derive(Debug, Clone, Default)]
pub struct AssetDraft {
    pub name: String,
    pub asset_type_id: Option<String>,
    pub account_id: Option<String>,
    pub contact_id: Option<String>,
    pub description: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<String>,
    pub price: Option<String>,
    /// Free-form engineer identity: canonical ID, email, or display name
    pub engineer: Option<String>,
}

/// Result of a creation attempt that did not fail in transport
#[derive(Debug)]
pub enum CreateOutcome {
    Created {
        id: String,
        /// Absent when the schema was unavailable and resolution was skipped
        resolution: Option<ResolutionResult>,
    },
    /// Creation was not attempted; the record cannot be anchored
    Skipped { reason: String },
}

/// Create an asset record through the full mapping pipeline.
pub async fn create_asset_record<A: CrmApi>(
    api: &A,
    draft: &AssetDraft,
    config: &EngineerMappingConfig,
    default_account_id: Option<&str>,
) -> Result<CreateOutcome, SalesforceError> {
    // Salesforce requires an Account or Contact anchor on every Asset.
    let mut account_id = draft
        .account_id
        .as_deref()
        .filter(|v| is_account_id(v));
    let contact_id = draft
        .contact_id
        .as_deref()
        .filter(|v| is_contact_id(v));

    if account_id.is_none() && contact_id.is_none() {
        match default_account_id {
            Some(id) => {
                info!(account_id = id, "anchoring asset to the default account");
                account_id = Some(id);
            }
            None => {
                let reason = "Asset requires an AccountId or ContactId and no default \
                              account is configured"
                    .to_string();
                warn!("{reason}");
                return Ok(CreateOutcome::Skipped { reason });
            }
        }
    }

    let mut payload = Map::new();
    payload.insert("Name".to_string(), json!(draft.name));
    if let Some(description) = draft.description.as_deref().filter(|d| !d.is_empty()) {
        payload.insert(
            "Description".to_string(),
            json!(truncate_chars(description, MAX_DESCRIPTION_LEN)),
        );
    }
    if let Some(type_id) = draft.asset_type_id.as_deref() {
        if looks_like_record_id(type_id) {
            payload.insert("Asset_Type__c".to_string(), json!(type_id));
        }
    }
    if let Some(serial) = draft.serial_number.as_deref().filter(|s| !s.is_empty()) {
        payload.insert("SerialNumber".to_string(), json!(serial));
    }
    if let Some(date) = draft.purchase_date.as_deref().filter(|d| !d.is_empty()) {
        payload.insert("PurchaseDate".to_string(), json!(date));
    }
    if let Some(price) = draft.price.as_deref().filter(|p| !p.is_empty()) {
        // numeric when it parses, verbatim otherwise (the filter drops it
        // later if the org has no such field)
        match price.parse::<f64>() {
            Ok(value) => payload.insert("Price__c".to_string(), json!(value)),
            Err(_) => payload.insert("Price__c".to_string(), json!(price)),
        };
    }
    if let Some(id) = account_id {
        payload.insert("AccountId".to_string(), json!(id));
    }
    if let Some(id) = contact_id {
        payload.insert("ContactId".to_string(), json!(id));
    }

    // Schema snapshot; on failure the payload goes out exactly as supplied.
    let schema = match api.describe_fields(ASSET_OBJECT).await {
        Ok(fields) => Some(SchemaDescription::new(fields)),
        Err(err) => {
            warn!(error = %err, "could not describe Asset; submitting unfiltered payload");
            None
        }
    };

    let mut resolution = None;
    if let Some(schema) = &schema {
        let target_field = mapping::choose_user_field(schema, config);
        let engineer = draft.engineer.as_deref().unwrap_or("");
        let result = resolve_user(engineer, config, api).await;
        debug!(attempts = ?result.attempts, "engineer resolution trail");
        if result.resolved_id.is_none() && !engineer.trim().is_empty() {
            info!(
                attempts = result.attempts.len(),
                "no user resolved for engineer identity; creating without a user reference"
            );
        }
        mapping::apply_resolution(
            &mut payload,
            schema,
            target_field,
            &result,
            draft.engineer.as_deref(),
            config,
        );
        mapping::filter_to_schema(&mut payload, schema);
        resolution = Some(result);
    }

    let id = api.create_record(ASSET_OBJECT, &payload).await?;
    info!(asset_id = %id, "Salesforce Asset created");
    Ok(CreateOutcome::Created { id, resolution })
}

/// Truncate on a character boundary
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }
}
