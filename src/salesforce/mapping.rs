//! Target-field selection and payload merge against a schema snapshot
//!
//! Selection precedence is deliberate and must not be reordered: explicit
//! configuration beats convention beats structural inference beats label
//! heuristics beats the universal owner fallback. In an ambiguous schema,
//! a reorder changes which field silently receives written data.

use serde_json::{json, Map, Value};
use tracing::warn;

use super::resolver::ResolutionResult;
use super::schema::{SchemaDescription, USER_OBJECT};
use super::EngineerMappingConfig;

/// The universal owner field every sobject carries
pub const OWNER_FIELD: &str = "OwnerId";

/// Conventional custom user-lookup field names, tried in order
pub const CONVENTIONAL_USER_FIELDS: &[&str] =
    &["User__c", "Assigned_User__c", "Technician__c", "Engineer__c"];

/// Role-indicating label fragments for heuristic field matching
const ROLE_LABEL_HINTS: &[&str] = &["engineer", "technician", "assigned", "user"];

/// Plain-text fields that can carry the engineer identity when the schema
/// has no usable reference field, tried in order
pub const FALLBACK_TEXT_FIELDS: &[&str] =
    &["Engineer_Name__c", "Assigned_To__c", "Technician_Name__c"];

/// Free-text description field used as the note target of last resort
pub const DESCRIPTION_FIELD: &str = "Description";

/// Select the field that should hold the resolved user reference.
///
/// Priority order, stopping at the first match:
/// 1. the configured preferred field, when present and a reference type
///    (configured-but-unusable warns and continues, never fails)
/// 2. the first conventional field name that is a present reference type
/// 3. any reference field targeting the User object
/// 4. any reference field whose label carries a role-indicating fragment
/// 5. the universal owner field
pub fn choose_user_field<'a>(
    schema: &'a SchemaDescription,
    config: &EngineerMappingConfig,
) -> Option<&'a str> {
    if let Some(preferred) = &config.preferred_user_field {
        match schema.field(preferred) {
            Some(field) if field.is_reference() => return Some(field.name.as_str()),
            Some(_) => warn!(
                field = preferred.as_str(),
                "preferred user lookup field is not a reference type; ignoring"
            ),
            None => warn!(
                field = preferred.as_str(),
                "preferred user lookup field not present on object; ignoring"
            ),
        }
    }

    for candidate in CONVENTIONAL_USER_FIELDS {
        if let Some(field) = schema.field(candidate) {
            if field.is_reference() {
                return Some(field.name.as_str());
            }
        }
    }

    if let Some(field) = schema
        .reference_fields()
        .find(|f| f.references(USER_OBJECT))
    {
        return Some(field.name.as_str());
    }

    if let Some(field) = schema.reference_fields().find(|f| {
        let label = f.label.to_lowercase();
        ROLE_LABEL_HINTS.iter().any(|hint| label.contains(hint))
    }) {
        return Some(field.name.as_str());
    }

    schema.field(OWNER_FIELD).map(|f| f.name.as_str())
}

/// Merge a resolution result into the outgoing payload.
///
/// With a resolved ID and a chosen field, the ID lands on that field (and
/// additionally on the owner field in write-both mode, for consumers that
/// only read ownership). Without a chosen field the owner field is the last
/// typed resort; failing that, the human-readable identity goes into a
/// conventional text field or as a note on the description.
pub fn apply_resolution(
    payload: &mut Map<String, Value>,
    schema: &SchemaDescription,
    target_field: Option<&str>,
    resolution: &ResolutionResult,
    raw_identity: Option<&str>,
    config: &EngineerMappingConfig,
) {
    let Some(resolved_id) = &resolution.resolved_id else {
        return;
    };

    match target_field {
        Some(field) => {
            payload.insert(field.to_string(), json!(resolved_id));
            if config.write_both && field != OWNER_FIELD && schema.contains(OWNER_FIELD) {
                payload.insert(OWNER_FIELD.to_string(), json!(resolved_id));
            }
        }
        None if schema.contains(OWNER_FIELD) => {
            payload.insert(OWNER_FIELD.to_string(), json!(resolved_id));
        }
        None => {
            let identity = raw_identity
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(resolved_id.as_str());
            if let Some(field) = FALLBACK_TEXT_FIELDS.iter().find(|f| schema.contains(f)) {
                payload.insert(field.to_string(), json!(identity));
            } else if schema.contains(DESCRIPTION_FIELD) {
                let note = format!("Assigned engineer: {identity}");
                match payload.get_mut(DESCRIPTION_FIELD) {
                    Some(Value::String(existing)) => {
                        existing.push('\n');
                        existing.push_str(&note);
                    }
                    _ => {
                        payload.insert(DESCRIPTION_FIELD.to_string(), json!(note));
                    }
                }
            }
        }
    }
}

/// Drop every payload key the schema does not have. Idempotent; after
/// filtering, the key set is always a subset of the schema's field names.
pub fn filter_to_schema(payload: &mut Map<String, Value>, schema: &SchemaDescription) {
    payload.retain(|key, _| schema.contains(key));
}
