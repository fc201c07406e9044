//! Failure taxonomy for contract checks
//!
//! Every check converts its outcome into one of these typed failures;
//! nothing is silently swallowed.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A check-level failure, classified by origin.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CheckFailure {
    /// Network unreachable, timeout, or malformed response envelope.
    #[error("transport: {message}")]
    Transport { message: String },

    /// The service responded but violated the expected contract.
    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),

    /// The service explicitly denied the operation under access-control rules.
    #[error("policy violation: {operation} denied ({cause})")]
    Policy {
        operation: String,
        cause: DenialCause,
    },

    /// The declared schema lacks expected columns.
    #[error("schema violation: missing columns [{}]", .missing.join(", "))]
    Schema { missing: Vec<String> },
}

impl CheckFailure {
    /// Remediation category for diagnosable failures.
    pub fn remediation(&self) -> Option<RemediationCategory> {
        match self {
            CheckFailure::Policy { cause, .. } => Some(cause.remediation()),
            _ => None,
        }
    }
}

/// Mismatch between an endpoint's actual and expected response.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "violation", content = "detail", rename_all = "snake_case")]
pub enum ContractViolation {
    #[error("unexpected body: {0}")]
    UnexpectedBody(String),

    #[error("missing field `{0}` in response")]
    MissingField(String),

    #[error("wrong shape: {0}")]
    WrongShape(String),

    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),

    #[error("field `{field}` mismatch: expected `{expected}`, got `{actual}`")]
    FieldMismatch {
        field: String,
        expected: String,
        actual: String,
    },
}

/// Probable cause of an insert denial, inferred from the response.
///
/// Heuristic pattern-matching on status code and body text; never assumed
/// exhaustive, hence the explicit `Unknown` fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialCause {
    /// Row-level policies appear to be absent entirely.
    PolicyNotEnabled,
    /// Policies are enabled but no rule allows anonymous inserts.
    NoInsertPolicy,
    /// The anonymous role lacks the insert privilege.
    MissingGrant,
    /// None of the known patterns matched.
    Unknown,
}

impl DenialCause {
    pub fn remediation(self) -> RemediationCategory {
        match self {
            DenialCause::PolicyNotEnabled => RemediationCategory::EnableRowPolicies,
            DenialCause::NoInsertPolicy => RemediationCategory::AddInsertPolicy,
            DenialCause::MissingGrant => RemediationCategory::GrantInsertPrivilege,
            DenialCause::Unknown => RemediationCategory::Investigate,
        }
    }
}

impl fmt::Display for DenialCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialCause::PolicyNotEnabled => write!(f, "row policies not enabled"),
            DenialCause::NoInsertPolicy => write!(f, "no allow rule for anonymous inserts"),
            DenialCause::MissingGrant => write!(f, "anonymous role lacks insert grant"),
            DenialCause::Unknown => write!(f, "unknown cause"),
        }
    }
}

/// Advisory remediation category. Categories only, never literal fix text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemediationCategory {
    EnableRowPolicies,
    AddInsertPolicy,
    GrantInsertPrivilege,
    Investigate,
}

impl fmt::Display for RemediationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemediationCategory::EnableRowPolicies => {
                write!(f, "enable row-level policies on the collection")
            }
            RemediationCategory::AddInsertPolicy => {
                write!(f, "add an allow rule for anonymous inserts")
            }
            RemediationCategory::GrantInsertPrivilege => {
                write!(f, "grant the insert privilege to the anonymous role")
            }
            RemediationCategory::Investigate => {
                write!(f, "inspect the store's policy configuration manually")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_failure_names_columns() {
        let failure = CheckFailure::Schema {
            missing: vec!["role".to_string(), "email".to_string()],
        };
        assert_eq!(
            failure.to_string(),
            "schema violation: missing columns [role, email]"
        );
    }

    #[test]
    fn test_field_mismatch_display() {
        let violation = ContractViolation::FieldMismatch {
            field: "email".to_string(),
            expected: "a@b.edu".to_string(),
            actual: "c@d.edu".to_string(),
        };
        assert_eq!(
            violation.to_string(),
            "field `email` mismatch: expected `a@b.edu`, got `c@d.edu`"
        );
    }

    #[test]
    fn test_remediation_only_for_policy_failures() {
        let policy = CheckFailure::Policy {
            operation: "insert".to_string(),
            cause: DenialCause::NoInsertPolicy,
        };
        assert_eq!(
            policy.remediation(),
            Some(RemediationCategory::AddInsertPolicy)
        );

        let contract = CheckFailure::Contract(ContractViolation::UnexpectedStatus(500));
        assert!(contract.remediation().is_none());
    }

    #[test]
    fn test_denial_cause_remediation_mapping() {
        assert_eq!(
            DenialCause::PolicyNotEnabled.remediation(),
            RemediationCategory::EnableRowPolicies
        );
        assert_eq!(
            DenialCause::MissingGrant.remediation(),
            RemediationCategory::GrantInsertPrivilege
        );
        assert_eq!(
            DenialCause::Unknown.remediation(),
            RemediationCategory::Investigate
        );
    }
}
