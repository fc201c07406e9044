//! Record store checks
//!
//! Checks 4-10: reachability, table visibility, declared schema, read
//! access, and the insertion contract (permission, field echo, bracket
//! sweep).

use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info};

use super::diagnose::classify_denial;
use crate::http::RecordStore;
use crate::models::{
    unique_email, CheckCase, CheckFailure, CheckResult, ContractViolation, DenialCause,
    WaitlistRecord,
};
use crate::schema::{SchemaRevision, COLLECTION};

/// Check 4: the store's REST surface answers at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct StoreReachableCheck;

impl StoreReachableCheck {
    pub async fn run(&self, store: &RecordStore) -> CheckResult {
        info!("Running Store Reachability check");
        let start = Instant::now();
        let check = CheckCase::StoreReachable;

        match store.schema_document().await {
            Ok(resp) if resp.status_code == 200 => CheckResult::pass(check, elapsed_ms(start))
                .with_message("store responded to the schema endpoint"),
            Ok(resp) => CheckResult::fail(
                check,
                elapsed_ms(start),
                ContractViolation::UnexpectedStatus(resp.status_code).into(),
            ),
            Err(e) => CheckResult::error(check, elapsed_ms(start), e.to_string()),
        }
    }
}

/// Check 5: the waitlist collection is visible to the anonymous tier.
#[derive(Clone, Copy, Debug, Default)]
pub struct TableVisibleCheck;

impl TableVisibleCheck {
    pub async fn run(&self, store: &RecordStore) -> CheckResult {
        info!("Running Table Visibility check");
        let start = Instant::now();
        let check = CheckCase::TableVisible;

        match store.table_probe(COLLECTION).await {
            Ok(resp) if resp.status_code == 200 => CheckResult::pass(check, elapsed_ms(start))
                .with_message(format!("collection `{COLLECTION}` exists")),
            Ok(resp) if resp.status_code == 404 || resp.status_code == 401 => CheckResult::fail(
                check,
                elapsed_ms(start),
                ContractViolation::UnexpectedStatus(resp.status_code).into(),
            )
            .with_message(format!(
                "collection `{COLLECTION}` does not exist or access denied (status {})",
                resp.status_code
            )),
            Ok(resp) => CheckResult::fail(
                check,
                elapsed_ms(start),
                ContractViolation::UnexpectedStatus(resp.status_code).into(),
            ),
            Err(e) => CheckResult::error(check, elapsed_ms(start), e.to_string()),
        }
    }
}

/// Check 6: the store's declared schema carries every expected column of the
/// selected revision.
#[derive(Clone, Copy, Debug)]
pub struct SchemaCheck {
    pub revision: SchemaRevision,
}

impl SchemaCheck {
    pub fn new(revision: SchemaRevision) -> Self {
        Self { revision }
    }

    pub async fn run(&self, store: &RecordStore) -> CheckResult {
        info!(
            "Running Declared Schema check against revision {}",
            self.revision
        );
        let start = Instant::now();
        let check = CheckCase::StoreSchema;

        let response = match store.schema_document().await {
            Ok(resp) => resp,
            Err(e) => return CheckResult::error(check, elapsed_ms(start), e.to_string()),
        };

        if response.status_code != 200 {
            return CheckResult::fail(
                check,
                elapsed_ms(start),
                ContractViolation::UnexpectedStatus(response.status_code).into(),
            );
        }

        let document = match response.json() {
            Ok(value) => value,
            Err(e) => {
                return CheckResult::error(
                    check,
                    elapsed_ms(start),
                    format!("malformed schema document: {e}"),
                )
            }
        };

        let collection_declared = document
            .get("paths")
            .and_then(Value::as_object)
            .map(|paths| paths.contains_key(&format!("/{COLLECTION}")))
            .unwrap_or(false);

        if !collection_declared {
            return CheckResult::fail(
                check,
                elapsed_ms(start),
                ContractViolation::UnexpectedBody(format!(
                    "collection `/{COLLECTION}` not declared in the schema document"
                ))
                .into(),
            );
        }

        let declared_columns = document
            .get("definitions")
            .and_then(|d| d.get(COLLECTION))
            .and_then(|t| t.get("properties"))
            .and_then(Value::as_object);

        let missing: Vec<String> = self
            .revision
            .expected_columns()
            .iter()
            .filter(|column| {
                declared_columns
                    .map(|properties| !properties.contains_key(**column))
                    .unwrap_or(true)
            })
            .map(|column| (*column).to_string())
            .collect();

        if !missing.is_empty() {
            return CheckResult::fail(check, elapsed_ms(start), CheckFailure::Schema { missing });
        }

        CheckResult::pass(check, elapsed_ms(start)).with_message(format!(
            "all {} expected columns declared",
            self.revision.expected_columns().len()
        ))
    }
}

/// Check 7: single-row read probe under the anonymous read policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReadAccessCheck;

impl ReadAccessCheck {
    pub async fn run(&self, store: &RecordStore) -> CheckResult {
        info!("Running Read Access check");
        let start = Instant::now();
        let check = CheckCase::ReadAccess;

        match store.read_probe(COLLECTION).await {
            Ok(resp) if resp.status_code == 200 => {
                CheckResult::pass(check, elapsed_ms(start)).with_message("anonymous read allowed")
            }
            Ok(resp) if resp.status_code == 401 || resp.status_code == 403 => CheckResult::denied(
                check,
                elapsed_ms(start),
                CheckFailure::Policy {
                    operation: "read".to_string(),
                    cause: classify_denial(resp.status_code, &resp.body),
                },
            ),
            Ok(resp) => CheckResult::fail(
                check,
                elapsed_ms(start),
                ContractViolation::UnexpectedStatus(resp.status_code).into(),
            ),
            Err(e) => CheckResult::error(check, elapsed_ms(start), e.to_string()),
        }
    }
}

/// Terminal state of one insertion attempt. No retry transitions: a denial
/// is diagnostic information, not a transient fault.
#[derive(Clone, Debug)]
pub enum InsertOutcome {
    /// 201 with the echoed representation rows.
    Accepted(Vec<Value>),
    /// Explicitly rejected by the access-policy layer.
    Denied(DenialCause),
    /// Any other non-201 status.
    Rejected(u16),
}

/// Issue a single insert and classify its terminal state.
async fn attempt_insert(
    store: &RecordStore,
    payload: &Value,
) -> anyhow::Result<InsertOutcome> {
    let response = store.insert(COLLECTION, payload).await?;

    if response.status_code == 201 {
        let rows = match response.json() {
            Ok(Value::Array(rows)) => rows,
            Ok(row @ Value::Object(_)) => vec![row],
            Ok(other) => {
                anyhow::bail!("representation has unexpected shape: {other}")
            }
            Err(e) => anyhow::bail!("malformed representation body: {e}"),
        };
        return Ok(InsertOutcome::Accepted(rows));
    }

    let lower = response.body.to_lowercase();
    let policy_denial = response.status_code == 403
        || lower.contains("permission denied")
        || lower.contains("row-level security")
        || lower.contains("row level security");

    if policy_denial {
        return Ok(InsertOutcome::Denied(classify_denial(
            response.status_code,
            &response.body,
        )));
    }

    Ok(InsertOutcome::Rejected(response.status_code))
}

/// Check 8: a fully-populated record is accepted under the anonymous tier.
#[derive(Clone, Debug)]
pub struct InsertPermissionCheck {
    pub record: WaitlistRecord,
    pub revision: SchemaRevision,
}

impl InsertPermissionCheck {
    pub fn new(record: WaitlistRecord, revision: SchemaRevision) -> Self {
        Self { record, revision }
    }

    /// Returns the check result plus, for accepted inserts, the echoed rows
    /// for the field-echo check to consume.
    pub async fn run(&self, store: &RecordStore) -> (CheckResult, Option<Vec<Value>>) {
        info!("Running Insert Permission check");
        let start = Instant::now();
        let check = CheckCase::InsertPermission;

        let payload = self.record.to_payload(self.revision);

        match attempt_insert(store, &payload).await {
            Ok(InsertOutcome::Accepted(rows)) => {
                let result = CheckResult::pass(check, elapsed_ms(start))
                    .with_message("record accepted with echoed representation");
                (result, Some(rows))
            }
            Ok(InsertOutcome::Denied(cause)) => {
                let result = CheckResult::denied(
                    check,
                    elapsed_ms(start),
                    CheckFailure::Policy {
                        operation: "insert".to_string(),
                        cause,
                    },
                );
                (result, None)
            }
            Ok(InsertOutcome::Rejected(code)) => {
                let result = CheckResult::fail(
                    check,
                    elapsed_ms(start),
                    ContractViolation::UnexpectedStatus(code).into(),
                );
                (result, None)
            }
            Err(e) => (
                CheckResult::error(check, elapsed_ms(start), e.to_string()),
                None,
            ),
        }
    }
}

/// Check 9: every supplied field comes back equal in the first echoed row.
#[derive(Clone, Debug)]
pub struct FieldEchoCheck {
    pub record: WaitlistRecord,
    pub revision: SchemaRevision,
}

impl FieldEchoCheck {
    pub fn new(record: WaitlistRecord, revision: SchemaRevision) -> Self {
        Self { record, revision }
    }

    /// Pure verification over the rows echoed by an accepted insert.
    pub fn verify(&self, rows: &[Value]) -> CheckResult {
        info!("Running Field Echo check");
        let start = Instant::now();
        let check = CheckCase::FieldEcho;

        let Some(first) = rows.first() else {
            return CheckResult::fail(
                check,
                elapsed_ms(start),
                ContractViolation::WrongShape("representation contained no rows".to_string())
                    .into(),
            );
        };

        for (field, expected) in self.record.echo_fields(self.revision) {
            match first.get(field).and_then(Value::as_str) {
                Some(actual) if actual == expected => {}
                Some(actual) => {
                    return CheckResult::fail(
                        check,
                        elapsed_ms(start),
                        ContractViolation::FieldMismatch {
                            field: field.to_string(),
                            expected: expected.to_string(),
                            actual: actual.to_string(),
                        }
                        .into(),
                    )
                }
                None => {
                    return CheckResult::fail(
                        check,
                        elapsed_ms(start),
                        ContractViolation::MissingField(field.to_string()).into(),
                    )
                }
            }
        }

        CheckResult::pass(check, elapsed_ms(start))
            .with_message("all submitted fields echoed field-for-field")
    }
}

/// Check 10: every enumerated `student_count` bracket independently satisfies
/// the insert contract. Each iteration uses a distinct unique email to avoid
/// uniqueness collisions.
#[derive(Clone, Debug)]
pub struct BracketSweepCheck {
    pub base: WaitlistRecord,
    pub revision: SchemaRevision,
}

impl BracketSweepCheck {
    pub fn new(base: WaitlistRecord, revision: SchemaRevision) -> Self {
        Self { base, revision }
    }

    pub async fn run(&self, store: &RecordStore) -> CheckResult {
        info!("Running Bracket Sweep check");
        let start = Instant::now();
        let check = CheckCase::BracketSweep;

        let mut details = Vec::new();
        let mut denied: Vec<(&str, DenialCause)> = Vec::new();
        let mut rejected: Vec<(&str, u16)> = Vec::new();

        for bracket in self.revision.student_count_brackets().iter().copied() {
            debug!("Sweeping bracket: {bracket}");

            let record = self
                .base
                .clone()
                .with_email(unique_email("probe"))
                .with_student_count(bracket);
            let payload = record.to_payload(self.revision);

            match attempt_insert(store, &payload).await {
                Ok(InsertOutcome::Accepted(_)) => {
                    details.push(format!("✓ {bracket}"));
                }
                Ok(InsertOutcome::Denied(cause)) => {
                    details.push(format!("⚠ {bracket} denied ({cause})"));
                    denied.push((bracket, cause));
                }
                Ok(InsertOutcome::Rejected(code)) => {
                    details.push(format!("✗ {bracket} rejected with status {code}"));
                    rejected.push((bracket, code));
                }
                Err(e) => {
                    return CheckResult::error(
                        check,
                        elapsed_ms(start),
                        format!("bracket `{bracket}` probe failed: {e}"),
                    )
                }
            }
        }

        if let Some((_, cause)) = denied.first() {
            let values: Vec<&str> = denied.iter().map(|(bracket, _)| *bracket).collect();
            return CheckResult::denied(
                check,
                elapsed_ms(start),
                CheckFailure::Policy {
                    operation: "insert".to_string(),
                    cause: *cause,
                },
            )
            .with_message(format!("brackets denied: {}", values.join(", ")));
        }

        if !rejected.is_empty() {
            let values: Vec<String> = rejected
                .iter()
                .map(|(bracket, code)| format!("`{bracket}` (status {code})"))
                .collect();
            return CheckResult::fail(
                check,
                elapsed_ms(start),
                ContractViolation::UnexpectedBody(format!(
                    "brackets rejected: {}",
                    values.join(", ")
                ))
                .into(),
            );
        }

        CheckResult::pass(check, elapsed_ms(start)).with_message(format!(
            "all {} brackets accepted",
            self.revision.student_count_brackets().len()
        ))
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::testutil::{config_for, spawn_backend, StubOptions};
    use crate::models::CheckStatus;
    use serde_json::json;

    #[test]
    fn test_field_echo_accepts_exact_row() {
        let record = WaitlistRecord::sample();
        let check = FieldEchoCheck::new(record.clone(), SchemaRevision::Current);

        let rows = vec![json!({
            "id": 7,
            "first_name": "Sarah",
            "last_name": "Johnson",
            "email": "sarah.johnson@testuni.edu",
            "institution": "Test University",
            "role": "Admissions Director",
            "student_count": "1,000 - 5,000",
            "created_at": "2025-04-05T12:00:00.000Z",
        })];

        let result = check.verify(&rows);
        assert!(result.status.is_success());
    }

    #[test]
    fn test_field_echo_flags_silent_transformation() {
        let record = WaitlistRecord::sample();
        let check = FieldEchoCheck::new(record, SchemaRevision::Current);

        let rows = vec![json!({
            "first_name": "Sarah",
            "last_name": "Johnson",
            "email": "SARAH.JOHNSON@TESTUNI.EDU",
            "institution": "Test University",
            "role": "Admissions Director",
            "student_count": "1,000 - 5,000",
        })];

        let result = check.verify(&rows);
        assert!(matches!(
            result.failure,
            Some(CheckFailure::Contract(ContractViolation::FieldMismatch { ref field, .. }))
                if field == "email"
        ));
    }

    #[test]
    fn test_field_echo_flags_missing_field() {
        let record = WaitlistRecord::sample();
        let check = FieldEchoCheck::new(record, SchemaRevision::Current);

        let rows = vec![json!({
            "first_name": "Sarah",
            "last_name": "Johnson",
            "email": "sarah.johnson@testuni.edu",
            "institution": "Test University",
            "student_count": "1,000 - 5,000",
        })];

        let result = check.verify(&rows);
        assert!(matches!(
            result.failure,
            Some(CheckFailure::Contract(ContractViolation::MissingField(ref field)))
                if field == "role"
        ));
    }

    #[test]
    fn test_field_echo_rejects_empty_representation() {
        let record = WaitlistRecord::sample();
        let check = FieldEchoCheck::new(record, SchemaRevision::Current);

        let result = check.verify(&[]);
        assert!(matches!(
            result.failure,
            Some(CheckFailure::Contract(ContractViolation::WrongShape(_)))
        ));
    }

    #[tokio::test]
    async fn test_insert_echo_round_trip() {
        let base = spawn_backend(StubOptions::default());
        let store = RecordStore::new(&config_for(&base), 5).unwrap();

        let record = WaitlistRecord::sample();
        let (result, rows) = InsertPermissionCheck::new(record.clone(), SchemaRevision::Current)
            .run(&store)
            .await;
        assert!(result.status.is_success(), "{:?}", result.message);

        let rows = rows.expect("accepted insert returns rows");
        assert_eq!(rows[0]["first_name"], "Sarah");
        assert_eq!(rows[0]["email"], "sarah.johnson@testuni.edu");

        let echo = FieldEchoCheck::new(record, SchemaRevision::Current).verify(&rows);
        assert!(echo.status.is_success(), "{:?}", echo.message);
    }

    #[tokio::test]
    async fn test_denied_insert_is_classified_not_fatal() {
        let base = spawn_backend(StubOptions {
            deny_insert: true,
            ..StubOptions::default()
        });
        let store = RecordStore::new(&config_for(&base), 5).unwrap();

        let (result, rows) =
            InsertPermissionCheck::new(WaitlistRecord::sample(), SchemaRevision::Current)
                .run(&store)
                .await;

        assert_eq!(result.status, CheckStatus::Denied);
        assert!(rows.is_none());
        assert!(matches!(
            result.failure,
            Some(CheckFailure::Policy {
                cause: DenialCause::NoInsertPolicy,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_rejected_insert_is_contract_violation() {
        let base = spawn_backend(StubOptions {
            reject_insert_with: Some(500),
            ..StubOptions::default()
        });
        let store = RecordStore::new(&config_for(&base), 5).unwrap();

        let (result, _) =
            InsertPermissionCheck::new(WaitlistRecord::sample(), SchemaRevision::Current)
                .run(&store)
                .await;

        assert_eq!(result.status, CheckStatus::Fail);
        assert!(matches!(
            result.failure,
            Some(CheckFailure::Contract(ContractViolation::UnexpectedStatus(
                500
            )))
        ));
    }

    #[tokio::test]
    async fn test_schema_missing_role_names_column() {
        let base = spawn_backend(StubOptions {
            schema_missing_role: true,
            ..StubOptions::default()
        });
        let store = RecordStore::new(&config_for(&base), 5).unwrap();

        let result = SchemaCheck::new(SchemaRevision::Current).run(&store).await;
        assert_eq!(result.status, CheckStatus::Fail);
        assert!(matches!(
            result.failure,
            Some(CheckFailure::Schema { ref missing }) if missing == &["role".to_string()]
        ));
    }

    #[tokio::test]
    async fn test_schema_passes_with_all_columns() {
        let base = spawn_backend(StubOptions::default());
        let store = RecordStore::new(&config_for(&base), 5).unwrap();

        let result = SchemaCheck::new(SchemaRevision::Current).run(&store).await;
        assert!(result.status.is_success(), "{:?}", result.message);
    }

    #[tokio::test]
    async fn test_legacy_revision_missing_columns_named() {
        // The stub declares the current columns, so the legacy expectation
        // must report its renamed fields as missing.
        let base = spawn_backend(StubOptions::default());
        let store = RecordStore::new(&config_for(&base), 5).unwrap();

        let result = SchemaCheck::new(SchemaRevision::Legacy).run(&store).await;
        assert_eq!(result.status, CheckStatus::Fail);
        assert!(matches!(
            result.failure,
            Some(CheckFailure::Schema { ref missing })
                if missing.contains(&"work_email".to_string())
                    && missing.contains(&"institution_name".to_string())
        ));
    }

    #[tokio::test]
    async fn test_bracket_sweep_accepts_every_value() {
        let base = spawn_backend(StubOptions::default());
        let store = RecordStore::new(&config_for(&base), 5).unwrap();

        let result = BracketSweepCheck::new(WaitlistRecord::sample(), SchemaRevision::Current)
            .run(&store)
            .await;
        assert!(result.status.is_success(), "{:?}", result.message);
        assert!(result
            .message
            .as_deref()
            .unwrap_or("")
            .contains("all 5 brackets accepted"));
    }

    #[tokio::test]
    async fn test_bracket_sweep_names_denied_values() {
        let base = spawn_backend(StubOptions {
            deny_insert: true,
            ..StubOptions::default()
        });
        let store = RecordStore::new(&config_for(&base), 5).unwrap();

        let result = BracketSweepCheck::new(WaitlistRecord::sample(), SchemaRevision::Current)
            .run(&store)
            .await;
        assert_eq!(result.status, CheckStatus::Denied);
        assert!(result
            .message
            .as_deref()
            .unwrap_or("")
            .contains("Under 1,000"));
    }

    #[tokio::test]
    async fn test_read_probe_allowed() {
        let base = spawn_backend(StubOptions::default());
        let store = RecordStore::new(&config_for(&base), 5).unwrap();

        let result = ReadAccessCheck.run(&store).await;
        assert!(result.status.is_success(), "{:?}", result.message);
    }

    #[tokio::test]
    async fn test_table_probe_sees_collection() {
        let base = spawn_backend(StubOptions::default());
        let store = RecordStore::new(&config_for(&base), 5).unwrap();

        let result = TableVisibleCheck.run(&store).await;
        assert!(result.status.is_success(), "{:?}", result.message);
    }
}
