//! Salesforce integration
//!
//! The transport client, schema introspection, engineer identity
//! resolution, and payload mapping. The resolution/mapping core is pure
//! over explicit snapshots and configuration; the client provides the
//! `CrmApi`/`UserLookup` seams it runs against.

pub mod client;
pub mod create;
pub mod mapping;
pub mod normalize;
pub mod resolver;
pub mod schema;
pub mod types;

pub use client::{SalesforceClient, SalesforceConfig};
pub use create::{create_asset_record, AssetDraft, CreateOutcome, CrmApi, ASSET_OBJECT};
pub use resolver::{
    resolve_user, IdentityQuery, ResolutionAttempt, ResolutionResult, Strategy, UserLookup,
};
pub use schema::{FieldMeta, SchemaDescription};

use crate::config::{env_flag, env_opt};

/// Configuration for engineer identity resolution and field mapping.
/// Read once at startup and passed explicitly into the core; the resolver
/// and selector never consult ambient process state.
#[derive(Debug, Clone, Default)]
pub struct EngineerMappingConfig {
    /// Field name the operator wants the user reference written to
    pub preferred_user_field: Option<String>,
    /// Attribution of last resort; also the force-default target
    pub default_user_id: Option<String>,
    /// Short-circuit every resolution to the default user
    pub force_default: bool,
    /// Duplicate the resolved user onto the owner field
    pub write_both: bool,
}

impl EngineerMappingConfig {
    pub fn from_env() -> Self {
        Self {
            preferred_user_field: env_opt("PREFERRED_USER_LOOKUP"),
            default_user_id: env_opt("DEFAULT_ASSET_USER_ID"),
            force_default: env_flag("FORCE_DEFAULT_USER"),
            write_both: env_flag("WRITE_BOTH_LOOKUPS"),
        }
    }
}
