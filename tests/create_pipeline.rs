//! End-to-end tests for the asset creation pipeline against a scripted CRM

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use inv_poc::error::SalesforceError;
use inv_poc::salesforce::types::UserRecord;
use inv_poc::salesforce::{
    create_asset_record, AssetDraft, CreateOutcome, CrmApi, EngineerMappingConfig, FieldMeta,
    UserLookup,
};

const CREATED_ID: &str = "02i000000000001";
const ACCOUNT: &str = "001000000000001";

fn field(name: &str, field_type: &str) -> FieldMeta {
    FieldMeta {
        name: name.to_string(),
        label: name.trim_end_matches("__c").replace('_', " "),
        field_type: field_type.to_string(),
        reference_to: Vec::new(),
    }
}

fn reference(name: &str, targets: &[&str]) -> FieldMeta {
    FieldMeta {
        name: name.to_string(),
        label: name.trim_end_matches("__c").replace('_', " "),
        field_type: "reference".to_string(),
        reference_to: targets.iter().map(|t| t.to_string()).collect(),
    }
}

fn asset_schema() -> Vec<FieldMeta> {
    vec![
        field("Name", "string"),
        field("Description", "textarea"),
        field("SerialNumber", "string"),
        field("PurchaseDate", "date"),
        field("Price__c", "currency"),
        field("Asset_Type__c", "reference"),
        reference("AccountId", &["Account"]),
        reference("ContactId", &["Contact"]),
        reference("OwnerId", &["User"]),
        reference("User__c", &["User"]),
    ]
}

/// Scripted CRM: describe and lookups answer from fixtures; created
/// payloads are captured for assertions.
struct MockCrm {
    fields: Option<Vec<FieldMeta>>,
    users: Vec<(&'static str, &'static str)>,
    created: Mutex<Vec<Map<String, Value>>>,
}

impl MockCrm {
    fn new(fields: Option<Vec<FieldMeta>>, users: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            fields,
            users,
            created: Mutex::new(Vec::new()),
        }
    }

    fn last_payload(&self) -> Map<String, Value> {
        self.created.lock().unwrap().last().cloned().expect("no record created")
    }
}

#[async_trait]
impl UserLookup for MockCrm {
    async fn find_user(&self, soql: &str) -> Result<Option<UserRecord>, SalesforceError> {
        Ok(self
            .users
            .iter()
            .find(|(pattern, _)| soql.contains(pattern))
            .map(|(_, id)| UserRecord {
                id: id.to_string(),
                name: Some("Scripted User".to_string()),
                email: None,
            }))
    }
}

#[async_trait]
impl CrmApi for MockCrm {
    async fn describe_fields(&self, _object_type: &str) -> Result<Vec<FieldMeta>, SalesforceError> {
        match &self.fields {
            Some(fields) => Ok(fields.clone()),
            None => Err(SalesforceError::SchemaUnavailable(
                "scripted describe failure".to_string(),
            )),
        }
    }

    async fn create_record(
        &self,
        _object_type: &str,
        fields: &Map<String, Value>,
    ) -> Result<String, SalesforceError> {
        self.created.lock().unwrap().push(fields.clone());
        Ok(CREATED_ID.to_string())
    }
}

fn draft(engineer: &str) -> AssetDraft {
    AssetDraft {
        name: "Extension Ladder".to_string(),
        account_id: Some(ACCOUNT.to_string()),
        description: Some("28-foot aluminum extension ladder.".to_string()),
        serial_number: Some("SN-1234".to_string()),
        price: Some("129.99".to_string()),
        engineer: Some(engineer.to_string()).filter(|e| !e.is_empty()),
        ..AssetDraft::default()
    }
}

#[tokio::test]
async fn email_identity_lands_on_the_user_field() {
    let crm = MockCrm::new(
        Some(asset_schema()),
        vec![("Email = 'alice@example.com'", "005000000000111")],
    );

    let outcome = create_asset_record(
        &crm,
        &draft("alice@example.com"),
        &EngineerMappingConfig::default(),
        None,
    )
    .await
    .unwrap();

    let CreateOutcome::Created { id, resolution } = outcome else {
        panic!("expected created outcome");
    };
    assert_eq!(id, CREATED_ID);

    let resolution = resolution.expect("schema was available");
    assert_eq!(resolution.resolved_id.as_deref(), Some("005000000000111"));
    assert_eq!(resolution.attempts.len(), 1);

    let payload = crm.last_payload();
    assert_eq!(payload.get("User__c"), Some(&json!("005000000000111")));
    assert_eq!(payload.get("AccountId"), Some(&json!(ACCOUNT)));
    // numeric price survived the round trip
    assert_eq!(payload.get("Price__c"), Some(&json!(129.99)));
    // write-both was off
    assert!(!payload.contains_key("OwnerId"));
}

#[tokio::test]
async fn ghost_identity_creates_without_user_reference() {
    let crm = MockCrm::new(Some(asset_schema()), Vec::new());

    let outcome = create_asset_record(
        &crm,
        &draft("ghost"),
        &EngineerMappingConfig::default(),
        None,
    )
    .await
    .unwrap();

    assert!(matches!(outcome, CreateOutcome::Created { .. }));
    let payload = crm.last_payload();
    assert!(!payload.contains_key("User__c"));
    assert!(!payload.contains_key("OwnerId"));
    assert_eq!(payload.get("Name"), Some(&json!("Extension Ladder")));
}

#[tokio::test]
async fn describe_failure_submits_payload_as_supplied() {
    let crm = MockCrm::new(None, vec![("Email = 'alice@example.com'", "005000000000111")]);

    let mut supplied = draft("alice@example.com");
    // bogus field only the filter would drop
    supplied.asset_type_id = Some("a0X5g0000012345".to_string());

    let outcome = create_asset_record(
        &crm,
        &supplied,
        &EngineerMappingConfig::default(),
        None,
    )
    .await
    .unwrap();

    let CreateOutcome::Created { resolution, .. } = outcome else {
        panic!("expected created outcome");
    };
    // resolution was skipped entirely
    assert!(resolution.is_none());

    let payload = crm.last_payload();
    // everything the caller supplied went out, nothing was inferred
    assert_eq!(payload.get("Asset_Type__c"), Some(&json!("a0X5g0000012345")));
    assert!(!payload.contains_key("User__c"));
    assert!(!payload.contains_key("OwnerId"));
}

#[tokio::test]
async fn force_default_overrides_matching_email() {
    let crm = MockCrm::new(
        Some(asset_schema()),
        vec![("Email = 'alice@example.com'", "005000000000111")],
    );
    let config = EngineerMappingConfig {
        default_user_id: Some("005000000000099".to_string()),
        force_default: true,
        ..EngineerMappingConfig::default()
    };

    create_asset_record(&crm, &draft("alice@example.com"), &config, None)
        .await
        .unwrap();

    let payload = crm.last_payload();
    assert_eq!(payload.get("User__c"), Some(&json!("005000000000099")));
}

#[tokio::test]
async fn write_both_duplicates_onto_owner() {
    let crm = MockCrm::new(
        Some(asset_schema()),
        vec![("Name = 'Bob Smith'", "005000000000222")],
    );
    let config = EngineerMappingConfig {
        write_both: true,
        ..EngineerMappingConfig::default()
    };

    create_asset_record(&crm, &draft("Bob Smith"), &config, None)
        .await
        .unwrap();

    let payload = crm.last_payload();
    assert_eq!(payload.get("User__c"), Some(&json!("005000000000222")));
    assert_eq!(payload.get("OwnerId"), Some(&json!("005000000000222")));
}

#[tokio::test]
async fn missing_anchor_skips_creation() {
    let crm = MockCrm::new(Some(asset_schema()), Vec::new());

    let mut unanchored = draft("Bob Smith");
    unanchored.account_id = None;

    let outcome = create_asset_record(
        &crm,
        &unanchored,
        &EngineerMappingConfig::default(),
        None,
    )
    .await
    .unwrap();

    assert!(matches!(outcome, CreateOutcome::Skipped { .. }));
    assert!(crm.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn default_account_anchors_when_caller_supplies_none() {
    let crm = MockCrm::new(Some(asset_schema()), Vec::new());

    let mut unanchored = draft("");
    unanchored.account_id = None;

    let outcome = create_asset_record(
        &crm,
        &unanchored,
        &EngineerMappingConfig::default(),
        Some(ACCOUNT),
    )
    .await
    .unwrap();

    assert!(matches!(outcome, CreateOutcome::Created { .. }));
    assert_eq!(crm.last_payload().get("AccountId"), Some(&json!(ACCOUNT)));
}

#[tokio::test]
async fn parenthetical_identity_resolves_via_first_last_split() {
    let crm = MockCrm::new(
        Some(asset_schema()),
        vec![("FirstName = 'Bob' AND LastName = 'Smith'", "005000000000222")],
    );

    let outcome = create_asset_record(
        &crm,
        &draft("Bob Smith (Contractor)"),
        &EngineerMappingConfig::default(),
        None,
    )
    .await
    .unwrap();

    let CreateOutcome::Created { resolution, .. } = outcome else {
        panic!("expected created outcome");
    };
    let resolution = resolution.unwrap();
    assert_eq!(resolution.resolved_id.as_deref(), Some("005000000000222"));
    // exact and fuzzy name lookups failed first and are on the trail
    assert!(resolution.attempts.len() >= 3);

    let payload = crm.last_payload();
    assert_eq!(payload.get("User__c"), Some(&json!("005000000000222")));
}
