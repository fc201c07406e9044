//! Versioned expected-schema table for the waitlist collection
//!
//! The collection's field names and permission policy changed over time. Each
//! revision is a tagged variant carrying the declared-column expectations and
//! the wire-name mapping; the active revision is always selected explicitly,
//! never inferred from responses.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The collection holding waitlist submissions.
pub const COLLECTION: &str = "waitlist";

/// Enumerated `student_count` brackets offered by the signup form.
pub const STUDENT_COUNT_BRACKETS: &[&str] = &[
    "Under 1,000",
    "1,000 - 5,000",
    "5,000 - 10,000",
    "10,000 - 20,000",
    "Over 20,000",
];

/// A schema revision of the waitlist collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaRevision {
    /// The authoritative field set: `email`, `institution`, store-generated
    /// `created_at`.
    Current,
    /// The earlier field set: `work_email`, `institution_name`,
    /// client-supplied `created_at`.
    Legacy,
}

impl SchemaRevision {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "current" => Some(SchemaRevision::Current),
            "legacy" => Some(SchemaRevision::Legacy),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SchemaRevision::Current => "current",
            SchemaRevision::Legacy => "legacy",
        }
    }

    pub fn all() -> Vec<SchemaRevision> {
        vec![SchemaRevision::Current, SchemaRevision::Legacy]
    }

    /// Columns the store's schema document must declare for the collection.
    ///
    /// `created_at` is declared in both revisions; only the legacy revision
    /// supplied it from the client.
    pub fn expected_columns(&self) -> &'static [&'static str] {
        match self {
            SchemaRevision::Current => &[
                "first_name",
                "last_name",
                "email",
                "institution",
                "role",
                "student_count",
                "created_at",
            ],
            SchemaRevision::Legacy => &[
                "first_name",
                "last_name",
                "work_email",
                "institution_name",
                "role",
                "student_count",
                "created_at",
            ],
        }
    }

    /// Wire name of the email field.
    pub fn email_field(&self) -> &'static str {
        match self {
            SchemaRevision::Current => "email",
            SchemaRevision::Legacy => "work_email",
        }
    }

    /// Wire name of the institution field.
    pub fn institution_field(&self) -> &'static str {
        match self {
            SchemaRevision::Current => "institution",
            SchemaRevision::Legacy => "institution_name",
        }
    }

    /// Whether insert payloads carry a client-supplied `created_at`.
    pub fn client_supplies_created_at(&self) -> bool {
        matches!(self, SchemaRevision::Legacy)
    }

    /// Enumerated `student_count` values to sweep.
    pub fn student_count_brackets(&self) -> &'static [&'static str] {
        STUDENT_COUNT_BRACKETS
    }
}

impl fmt::Display for SchemaRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
