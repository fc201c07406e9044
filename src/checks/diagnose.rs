//! Denial-cause classifier
//!
//! Best-effort pattern matching on the denial response. The patterns cover
//! the store's known denial shapes; anything else falls through to `Unknown`.

use crate::models::DenialCause;

/// Classify an access-policy denial from its status code and body text.
pub fn classify_denial(status: u16, body: &str) -> DenialCause {
    let lower = body.to_lowercase();

    if lower.contains("row-level security") || lower.contains("row level security") {
        // The store evaluated a policy and found no allow rule.
        return DenialCause::NoInsertPolicy;
    }

    if lower.contains("permission denied") {
        return DenialCause::MissingGrant;
    }

    if status == 401 || status == 403 {
        return DenialCause::PolicyNotEnabled;
    }

    DenialCause::Unknown
}
