//! Asset inventory backend
//!
//! Accepts photographs of physical assets, derives descriptive metadata via
//! a vision-language model, persists records to local JSON stores and to
//! Salesforce, and renders PDF inventory reports.
//!
//! The interesting part is the Salesforce mapping core: engineer identities
//! arrive as free-form strings and must land on whichever user-reference
//! field the org's Asset object actually has. [`salesforce::resolver`] walks
//! an ordered ladder of lookup strategies, [`salesforce::schema`] snapshots
//! the describe metadata, and [`salesforce::mapping`] selects the target
//! field and filters the outgoing payload to schema-valid names. Everything
//! else (routes, file stores, vision client, PDF rendering) is thin I/O
//! around that core.

// Core error handling
pub mod error;

// Configuration, read once at startup
pub mod config;

// Local record types
pub mod models;

// Salesforce transport, schema introspection, identity resolution, mapping
pub mod salesforce;

// Vision-model metadata extraction
pub mod ai;

// JSON file persistence
pub mod store;

// PDF inventory reports
pub mod report;

pub use config::AppConfig;
pub use error::{InventoryError, ReportError, SalesforceError, StoreError, VisionError};
pub use models::{AssetRecord, CrmStatus, HistoryEntry};
