//! Salesforce REST wire types and record-ID helpers

use serde::Deserialize;

use super::schema::FieldMeta;

/// Object-key prefix for User records
pub const USER_ID_PREFIX: &str = "005";
/// Object-key prefix for Account records
pub const ACCOUNT_ID_PREFIX: &str = "001";
/// Object-key prefix for Contact records
pub const CONTACT_ID_PREFIX: &str = "003";

/// Canonical record ID shape: 3-character object prefix followed by 12-15
/// alphanumeric characters (the 15- and 18-character ID forms).
pub fn is_record_id(value: &str, prefix: &str) -> bool {
    (15..=18).contains(&value.len())
        && value.starts_with(prefix)
        && value.chars().all(|c| c.is_ascii_alphanumeric())
}

pub fn is_user_id(value: &str) -> bool {
    is_record_id(value, USER_ID_PREFIX)
}

pub fn is_account_id(value: &str) -> bool {
    is_record_id(value, ACCOUNT_ID_PREFIX)
}

pub fn is_contact_id(value: &str) -> bool {
    is_record_id(value, CONTACT_ID_PREFIX)
}

/// Loose ID check for custom-object references where the key prefix is
/// org-specific (e.g. `Asset_Type__c`)
pub fn looks_like_record_id(value: &str) -> bool {
    (15..=18).contains(&value.len()) && value.chars().all(|c| c.is_ascii_alphanumeric())
}

/// One page of SOQL query results
#[derive(Debug, Deserialize)]
pub struct QueryResponse<T> {
    #[serde(rename = "totalSize", default)]
    pub total_size: u32,
    #[serde(default)]
    pub done: bool,
    pub records: Vec<T>,
}

/// A User row from lookup queries
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
}

/// An `Asset_Type__c` row
#[derive(Debug, Clone, Deserialize)]
pub struct AssetTypeRecord {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

/// Object describe response; only the field list is consumed
#[derive(Debug, Deserialize)]
pub struct DescribeResponse {
    #[serde(default)]
    pub name: String,
    pub fields: Vec<FieldMeta>,
}

/// Response from sobject create
#[derive(Debug, Deserialize)]
pub struct CreateResponse {
    pub id: String,
    #[serde(default)]
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_shapes() {
        assert!(is_user_id("005000000000001"));
        assert!(is_user_id("005000000000001AAA"));
        assert!(!is_user_id("003000000000001")); // contact prefix
        assert!(!is_user_id("005-00000000001")); // non-alphanumeric
        assert!(!is_user_id("00500001")); // too short
        assert!(!is_user_id("0050000000000000001AAA")); // too long
    }

    #[test]
    fn test_loose_record_id() {
        assert!(looks_like_record_id("a0X5g000001abcd"));
        assert!(!looks_like_record_id("Ladder"));
        assert!(!looks_like_record_id(""));
    }
}
