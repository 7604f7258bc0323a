//! Error handling for the asset inventory backend
//!
//! Error types follow the degradation policy of the creation pipeline:
//! only a failed record create surfaces as a failed operation; schema
//! introspection and user lookup failures are recorded and the operation
//! continues.

use thiserror::Error;

/// Top-level error type for the inventory system
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Salesforce error: {0}")]
    Salesforce(#[from] SalesforceError),

    #[error("Vision analysis error: {0}")]
    Vision(#[from] VisionError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the Salesforce REST transport
#[derive(Error, Debug)]
pub enum SalesforceError {
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Object describe could not be fetched or parsed. Callers degrade to
    /// submitting the payload unfiltered.
    #[error("schema describe unavailable: {0}")]
    SchemaUnavailable(String),

    /// A user lookup query failed in transport. Recorded against the
    /// attempt; resolution continues with the next strategy.
    #[error("user lookup failed: {0}")]
    Lookup(String),

    /// Record creation failed. The only Salesforce error surfaced to the
    /// caller as a failed operation.
    #[error("record create failed: {0}")]
    Create(String),

    #[error("Salesforce API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors from the vision-model client
#[derive(Error, Debug)]
pub enum VisionError {
    #[error("vision API key not configured")]
    MissingApiKey,

    #[error("vision API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("vision response was not valid metadata JSON: {0}")]
    MalformedResponse(String),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors from the local JSON file stores
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed store file {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from PDF report rendering
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to decode asset image: {0}")]
    ImageDecode(String),

    #[error("PDF rendering failed: {0}")]
    Render(String),
}
