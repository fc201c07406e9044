//! Record models for the status API and the waitlist store
//!
//! `WaitlistRecord` holds the logical field values; the wire field names are
//! decided by the active schema revision at payload time.

use chrono::{SecondsFormat, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::schema::SchemaRevision;

/// A status record as returned by the status service.
///
/// `id` and `timestamp` are server-generated; the listing endpoint returns a
/// sequence of these.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusRecord {
    pub client_name: String,
    pub id: String,
    pub timestamp: String,
}

/// A waitlist submission. All fields required, all string-typed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub institution: String,
    pub role: String,
    pub student_count: String,
}

impl WaitlistRecord {
    /// Canonical probe record.
    pub fn sample() -> Self {
        Self {
            first_name: "Sarah".to_string(),
            last_name: "Johnson".to_string(),
            email: "sarah.johnson@testuni.edu".to_string(),
            institution: "Test University".to_string(),
            role: "Admissions Director".to_string(),
            student_count: "1,000 - 5,000".to_string(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_student_count(mut self, student_count: impl Into<String>) -> Self {
        self.student_count = student_count.into();
        self
    }

    /// Build the insert payload under the given revision's wire names.
    ///
    /// The legacy revision supplied `created_at` from the client; the current
    /// one leaves it to the store.
    pub fn to_payload(&self, revision: SchemaRevision) -> Value {
        let mut payload = Map::new();
        payload.insert("first_name".to_string(), json!(self.first_name));
        payload.insert("last_name".to_string(), json!(self.last_name));
        payload.insert(revision.email_field().to_string(), json!(self.email));
        payload.insert(
            revision.institution_field().to_string(),
            json!(self.institution),
        );
        payload.insert("role".to_string(), json!(self.role));
        payload.insert("student_count".to_string(), json!(self.student_count));

        if revision.client_supplies_created_at() {
            payload.insert(
                "created_at".to_string(),
                json!(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            );
        }

        Value::Object(payload)
    }

    /// Fields expected to be echoed back by a successful insert, as
    /// (wire name, submitted value) pairs.
    pub fn echo_fields(&self, revision: SchemaRevision) -> Vec<(&'static str, &str)> {
        vec![
            ("first_name", self.first_name.as_str()),
            ("last_name", self.last_name.as_str()),
            (revision.email_field(), self.email.as_str()),
            (revision.institution_field(), self.institution.as_str()),
            ("role", self.role.as_str()),
            ("student_count", self.student_count.as_str()),
        ]
    }
}

/// Generate a unique probe email to avoid uniqueness collisions across
/// repeated inserts.
pub fn unique_email(prefix: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("{}+{}@testuni.edu", prefix, suffix.to_lowercase())
}
