//! Engineer identity resolution against the User object
//!
//! Turns a free-form identity value (canonical ID, email address, or display
//! name) into a User record ID through an ordered ladder of lookup
//! strategies. Each query-issuing strategy is a pure planner from the
//! normalized input to a SOQL string; a single reducer walks the plan in
//! priority order and short-circuits on the first hit. A transport failure
//! in one strategy is recorded on the attempt trail and never aborts the
//! walk; exhausting the ladder without a match is a normal outcome, not an
//! error.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use super::normalize::normalize_identity;
use super::types::{is_user_id, UserRecord};
use super::EngineerMappingConfig;
use crate::error::SalesforceError;

/// Structurally classified identity input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityQuery {
    /// Already a canonical User record ID
    CanonicalId(String),
    /// Contains `@` and `.`: treated as an email address
    Email(String),
    /// Anything else: treated as a display name
    Name(String),
}

impl IdentityQuery {
    pub fn classify(raw: &str) -> Self {
        let value = raw.trim();
        if is_user_id(value) {
            Self::CanonicalId(value.to_string())
        } else if value.contains('@') && value.contains('.') {
            Self::Email(value.to_string())
        } else {
            Self::Name(value.to_string())
        }
    }
}

/// One resolution strategy, in fixed priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    ProvidedId,
    ForceDefault,
    Email,
    NameExact,
    NameLike,
    FirstLast,
    LastExact,
    LastLike,
    FallbackDefault,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::ProvidedId => "provided_id",
            Strategy::ForceDefault => "force_default",
            Strategy::Email => "email",
            Strategy::NameExact => "name_exact",
            Strategy::NameLike => "name_like",
            Strategy::FirstLast => "first_last",
            Strategy::LastExact => "last_exact",
            Strategy::LastLike => "last_like",
            Strategy::FallbackDefault => "fallback_default",
        }
    }
}

/// Outcome of a single strategy attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Found(String),
    NotFound,
    Error(String),
}

/// Diagnostic record of one strategy attempt. Attempts accumulate in order
/// and are surfaced through logs; they never alter control flow after the
/// fact.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionAttempt {
    pub strategy: Strategy,
    /// The query issued, absent for strategies that resolve without one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soql: Option<String>,
    pub outcome: AttemptOutcome,
}

/// Result of one resolution call
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolutionResult {
    pub resolved_id: Option<String>,
    pub attempts: Vec<ResolutionAttempt>,
}

/// Lookup seam: executes a single-row User query. The resolver only ever
/// consumes the first record.
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn find_user(&self, soql: &str) -> Result<Option<UserRecord>, SalesforceError>;
}

/// A planned resolution step: take a known ID outright, or issue a lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    Take(String),
    Query(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Probe {
    pub strategy: Strategy,
    pub action: Action,
}

fn query_probe(strategy: Strategy, soql: String) -> Probe {
    Probe {
        strategy,
        action: Action::Query(soql),
    }
}

/// Build the ordered probe plan for an identity query. Pure: no transport,
/// no ambient configuration reads.
pub(crate) fn plan(query: &IdentityQuery, config: &EngineerMappingConfig) -> Vec<Probe> {
    let mut probes = Vec::new();

    // A canonical ID needs no lookup and outranks everything.
    if let IdentityQuery::CanonicalId(id) = query {
        probes.push(Probe {
            strategy: Strategy::ProvidedId,
            action: Action::Take(id.clone()),
        });
        return probes;
    }

    // Operator override: attribute everything to the configured default.
    if config.force_default {
        if let Some(default_id) = &config.default_user_id {
            probes.push(Probe {
                strategy: Strategy::ForceDefault,
                action: Action::Take(default_id.clone()),
            });
            return probes;
        }
    }

    let raw = match query {
        IdentityQuery::Email(v) | IdentityQuery::Name(v) => v.as_str(),
        IdentityQuery::CanonicalId(_) => unreachable!("handled above"),
    };
    let escaped = normalize_identity(raw);

    if !escaped.is_empty() {
        if matches!(query, IdentityQuery::Email(_)) {
            probes.push(query_probe(
                Strategy::Email,
                format!("SELECT Id, Name, Email FROM User WHERE Email = '{escaped}' LIMIT 1"),
            ));
        }

        probes.push(query_probe(
            Strategy::NameExact,
            format!("SELECT Id, Name FROM User WHERE Name = '{escaped}' LIMIT 1"),
        ));
        probes.push(query_probe(
            Strategy::NameLike,
            format!("SELECT Id, Name FROM User WHERE Name LIKE '%{escaped}%' LIMIT 1"),
        ));

        let tokens: Vec<&str> = escaped.split_whitespace().collect();
        if tokens.len() >= 2 {
            let first = tokens[0];
            let last = tokens[tokens.len() - 1];
            probes.push(query_probe(
                Strategy::FirstLast,
                format!(
                    "SELECT Id, Name FROM User WHERE FirstName = '{first}' AND LastName = '{last}' LIMIT 1"
                ),
            ));
        }
        if let Some(last) = tokens.last() {
            probes.push(query_probe(
                Strategy::LastExact,
                format!("SELECT Id, Name FROM User WHERE LastName = '{last}' LIMIT 1"),
            ));
            probes.push(query_probe(
                Strategy::LastLike,
                format!("SELECT Id, Name FROM User WHERE LastName LIKE '%{last}%' LIMIT 1"),
            ));
        }
    }

    if let Some(default_id) = &config.default_user_id {
        probes.push(Probe {
            strategy: Strategy::FallbackDefault,
            action: Action::Take(default_id.clone()),
        });
    }

    probes
}

/// Resolve an identity value through the strategy ladder.
pub async fn resolve_user(
    raw: &str,
    config: &EngineerMappingConfig,
    lookup: &dyn UserLookup,
) -> ResolutionResult {
    let query = IdentityQuery::classify(raw);
    let mut attempts = Vec::new();

    for probe in plan(&query, config) {
        let (soql, outcome) = match probe.action {
            Action::Take(id) => (None, AttemptOutcome::Found(id)),
            Action::Query(soql) => {
                let outcome = match lookup.find_user(&soql).await {
                    Ok(Some(record)) => AttemptOutcome::Found(record.id),
                    Ok(None) => AttemptOutcome::NotFound,
                    Err(err) => AttemptOutcome::Error(err.to_string()),
                };
                (Some(soql), outcome)
            }
        };

        let found = match &outcome {
            AttemptOutcome::Found(id) => Some(id.clone()),
            _ => None,
        };
        attempts.push(ResolutionAttempt {
            strategy: probe.strategy,
            soql,
            outcome,
        });

        if let Some(id) = found {
            debug!(
                strategy = probe.strategy.name(),
                attempts = attempts.len(),
                "engineer identity resolved"
            );
            return ResolutionResult {
                resolved_id: Some(id),
                attempts,
            };
        }
    }

    ResolutionResult {
        resolved_id: None,
        attempts,
    }
}
