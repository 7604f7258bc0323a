//! Immutable schema snapshot built from object describe metadata
//!
//! The external object's fields are discovered at call time; modeling the
//! describe result as an explicit value type keeps the priority-ordered
//! field selection testable against constructed fixtures, without a live
//! connection.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The describe `type` value marking a lookup/reference field
pub const REFERENCE_FIELD_TYPE: &str = "reference";

/// Target object name for user references
pub const USER_OBJECT: &str = "User";

/// Metadata for one field of a described object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMeta {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(rename = "referenceTo", default)]
    pub reference_to: Vec<String>,
}

impl FieldMeta {
    pub fn is_reference(&self) -> bool {
        self.field_type == REFERENCE_FIELD_TYPE
    }

    /// Whether this reference field can point at the given object type
    pub fn references(&self, target: &str) -> bool {
        self.reference_to.iter().any(|t| t == target)
    }
}

/// Per-operation snapshot of an object's describe metadata. Constructed
/// fresh for each resolution operation and never cached across requests.
#[derive(Debug, Clone)]
pub struct SchemaDescription {
    fields: Vec<FieldMeta>,
    index: HashMap<String, usize>,
}

impl SchemaDescription {
    pub fn new(fields: Vec<FieldMeta>) -> Self {
        let mut index = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            // first occurrence wins on (unexpected) duplicate names
            index.entry(field.name.clone()).or_insert(i);
        }
        Self { fields, index }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldMeta> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// All fields, in describe order
    pub fn fields(&self) -> &[FieldMeta] {
        &self.fields
    }

    /// Reference-type fields, in describe order
    pub fn reference_fields(&self) -> impl Iterator<Item = &FieldMeta> {
        self.fields.iter().filter(|f| f.is_reference())
    }
}

#[cfg(test)]
pub(crate) fn field(name: &str, field_type: &str) -> FieldMeta {
    FieldMeta {
        name: name.to_string(),
        label: name.trim_end_matches("__c").replace('_', " "),
        field_type: field_type.to_string(),
        reference_to: Vec::new(),
    }
}

#[cfg(test)]
pub(crate) fn reference(name: &str, targets: &[&str]) -> FieldMeta {
    FieldMeta {
        name: name.to_string(),
        label: name.trim_end_matches("__c").replace('_', " "),
        field_type: REFERENCE_FIELD_TYPE.to_string(),
        reference_to: targets.iter().map(|t| t.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_lookup() {
        let schema = SchemaDescription::new(vec![
            field("Name", "string"),
            reference("OwnerId", &["User"]),
            reference("AccountId", &["Account"]),
        ]);

        assert!(schema.contains("Name"));
        assert!(schema.contains("OwnerId"));
        assert!(!schema.contains("Ghost__c"));

        let owner = schema.field("OwnerId").unwrap();
        assert!(owner.is_reference());
        assert!(owner.references(USER_OBJECT));
        assert!(!owner.references("Account"));

        assert_eq!(schema.reference_fields().count(), 2);
    }

    #[test]
    fn test_describe_deserialization() {
        let json = r#"{
            "name": "User__c",
            "label": "Assigned Engineer",
            "type": "reference",
            "referenceTo": ["User"]
        }"#;
        let meta: FieldMeta = serde_json::from_str(json).unwrap();
        assert_eq!(meta.name, "User__c");
        assert_eq!(meta.label, "Assigned Engineer");
        assert!(meta.is_reference());
        assert!(meta.references("User"));

        // non-reference fields omit referenceTo
        let json = r#"{"name": "Name", "label": "Asset Name", "type": "string"}"#;
        let meta: FieldMeta = serde_json::from_str(json).unwrap();
        assert!(!meta.is_reference());
        assert!(meta.reference_to.is_empty());
    }
}
