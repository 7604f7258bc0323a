//! Salesforce REST client
//!
//! OAuth2 password-grant login plus the API surfaces the inventory flow
//! needs: SOQL query, sobject describe, and sobject create. All requests
//! carry a bounded timeout and fail rather than retry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use super::create::CrmApi;
use super::resolver::UserLookup;
use super::schema::FieldMeta;
use super::types::{
    AssetTypeRecord, CreateResponse, DescribeResponse, QueryResponse, UserRecord,
};
use crate::config::env_or;
use crate::error::SalesforceError;

const API_VERSION: &str = "v59.0";
const HTTP_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the Salesforce org, read once at startup
#[derive(Debug, Clone)]
pub struct SalesforceConfig {
    pub username: String,
    pub password: String,
    /// Appended to the password in the token request, per the password grant
    pub security_token: String,
    pub client_id: String,
    pub client_secret: String,
    /// `login` for production orgs, `test` for sandboxes
    pub domain: String,
}

impl SalesforceConfig {
    pub fn from_env() -> Self {
        Self {
            username: env_or("SF_USERNAME", ""),
            password: env_or("SF_PASSWORD", ""),
            security_token: env_or("SF_SECURITY_TOKEN", ""),
            client_id: env_or("SF_CLIENT_ID", ""),
            client_secret: env_or("SF_CLIENT_SECRET", ""),
            domain: env_or("SF_DOMAIN", "login"),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty() && !self.client_id.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    instance_url: String,
}

/// A connected Salesforce session
pub struct SalesforceClient {
    http: Client,
    instance_url: String,
    access_token: String,
}

impl SalesforceClient {
    /// Authenticate and return a connected client. Absent credentials are an
    /// expected condition; callers degrade instead of aborting the request.
    pub async fn connect(config: &SalesforceConfig) -> Result<Self, SalesforceError> {
        if !config.is_configured() {
            return Err(SalesforceError::Auth(
                "Salesforce credentials not configured".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        let token_url = format!("https://{}.salesforce.com/services/oauth2/token", config.domain);
        let password = format!("{}{}", config.password, config.security_token);
        let params = [
            ("grant_type", "password"),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("username", config.username.as_str()),
            ("password", password.as_str()),
        ];

        let response = http.post(&token_url).form(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SalesforceError::Auth(format!(
                "{}: {}",
                status,
                snippet(&body)
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SalesforceError::Auth(format!("malformed token response: {e}")))?;

        info!(instance = %token.instance_url, "Salesforce connection established");
        Ok(Self {
            http,
            instance_url: token.instance_url,
            access_token: token.access_token,
        })
    }

    fn data_url(&self, path: &str) -> String {
        format!(
            "{}/services/data/{}/{}",
            self.instance_url, API_VERSION, path
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SalesforceError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SalesforceError::Api {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }
        Ok(response.json().await?)
    }

    /// Run a SOQL query returning typed rows
    pub async fn query<T: DeserializeOwned>(
        &self,
        soql: &str,
    ) -> Result<QueryResponse<T>, SalesforceError> {
        let url = self.data_url("query");
        let response = self
            .http
            .get(&url)
            .query(&[("q", soql)])
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SalesforceError::Api {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }
        Ok(response.json().await?)
    }

    pub async fn list_asset_types(&self) -> Result<Vec<AssetTypeRecord>, SalesforceError> {
        let page: QueryResponse<AssetTypeRecord> = self
            .query("SELECT Id, Name FROM Asset_Type__c ORDER BY Name")
            .await?;
        Ok(page.records)
    }

    pub async fn create_asset_type(&self, name: &str) -> Result<String, SalesforceError> {
        let mut fields = Map::new();
        fields.insert("Name".to_string(), Value::String(name.to_string()));
        self.create_record("Asset_Type__c", &fields).await
    }

    /// Raw describe output for the debug endpoint
    pub async fn describe_raw(&self, object_type: &str) -> Result<Vec<FieldMeta>, SalesforceError> {
        let describe: DescribeResponse = self
            .get_json(&self.data_url(&format!("sobjects/{object_type}/describe")))
            .await?;
        Ok(describe.fields)
    }
}

#[async_trait]
impl UserLookup for SalesforceClient {
    async fn find_user(&self, soql: &str) -> Result<Option<UserRecord>, SalesforceError> {
        let page: QueryResponse<UserRecord> = self
            .query(soql)
            .await
            .map_err(|e| SalesforceError::Lookup(e.to_string()))?;
        Ok(page.records.into_iter().next())
    }
}

#[async_trait]
impl CrmApi for SalesforceClient {
    async fn describe_fields(&self, object_type: &str) -> Result<Vec<FieldMeta>, SalesforceError> {
        self.describe_raw(object_type)
            .await
            .map_err(|e| SalesforceError::SchemaUnavailable(e.to_string()))
    }

    async fn create_record(
        &self,
        object_type: &str,
        fields: &Map<String, Value>,
    ) -> Result<String, SalesforceError> {
        let url = self.data_url(&format!("sobjects/{object_type}"));
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(fields)
            .send()
            .await
            .map_err(|e| SalesforceError::Create(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SalesforceError::Create(format!(
                "{}: {}",
                status,
                snippet(&body)
            )));
        }

        let created: CreateResponse = response
            .json()
            .await
            .map_err(|e| SalesforceError::Create(format!("malformed create response: {e}")))?;
        Ok(created.id)
    }
}

/// First 200 characters of an error body, for log-safe messages
fn snippet(body: &str) -> String {
    body.chars().take(200).collect()
}
