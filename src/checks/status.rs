//! Status API checks
//!
//! Checks 1-3: Root Greeting, Status Submit, Status Listing

use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info};

use crate::http::StatusApi;
use crate::models::{CheckCase, CheckFailure, CheckResult, ContractViolation, StatusRecord};

/// The greeting the root endpoint must return, verbatim.
pub const EXPECTED_GREETING: &str = "Hello World";

/// Check 1: the root endpoint returns the fixed greeting.
#[derive(Clone, Debug)]
pub struct RootGreetingCheck {
    pub greeting: String,
}

impl Default for RootGreetingCheck {
    fn default() -> Self {
        Self {
            greeting: EXPECTED_GREETING.to_string(),
        }
    }
}

impl RootGreetingCheck {
    pub async fn run(&self, api: &StatusApi) -> CheckResult {
        info!("Running Root Greeting check");
        let start = Instant::now();
        let check = CheckCase::RootGreeting;

        let response = match api.root().await {
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

        let body = match response.json() {
            Ok(value) => value,
            Err(e) => {
                return CheckResult::error(
                    check,
                    elapsed_ms(start),
                    format!("malformed response body: {e}"),
                )
            }
        };

        match body.get("message").and_then(Value::as_str) {
            Some(message) if message == self.greeting => CheckResult::pass(check, elapsed_ms(start))
                .with_message(format!("greeting `{}` matched", self.greeting)),
            Some(message) => CheckResult::fail(
                check,
                elapsed_ms(start),
                ContractViolation::UnexpectedBody(format!(
                    "expected greeting `{}`, got `{message}`",
                    self.greeting
                ))
                .into(),
            ),
            None => CheckResult::fail(
                check,
                elapsed_ms(start),
                ContractViolation::MissingField("message".to_string()).into(),
            ),
        }
    }
}

/// Check 2: submitting a status echoes the client name, returns generated
/// fields, and the new id appears exactly once in the listing.
#[derive(Clone, Debug)]
pub struct StatusSubmitCheck {
    pub client_name: String,
}

impl StatusSubmitCheck {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
        }
    }

    pub async fn run(&self, api: &StatusApi) -> CheckResult {
        info!("Running Status Submit check");
        let start = Instant::now();
        let check = CheckCase::StatusSubmit;

        let response = match api.submit_status(&self.client_name).await {
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

        let body = match response.json() {
            Ok(value) => value,
            Err(e) => {
                return CheckResult::error(
                    check,
                    elapsed_ms(start),
                    format!("malformed response body: {e}"),
                )
            }
        };

        match body.get("client_name").and_then(Value::as_str) {
            Some(echoed) if echoed == self.client_name => {}
            Some(echoed) => {
                return CheckResult::fail(
                    check,
                    elapsed_ms(start),
                    ContractViolation::FieldMismatch {
                        field: "client_name".to_string(),
                        expected: self.client_name.clone(),
                        actual: echoed.to_string(),
                    }
                    .into(),
                )
            }
            None => {
                return CheckResult::fail(
                    check,
                    elapsed_ms(start),
                    ContractViolation::MissingField("client_name".to_string()).into(),
                )
            }
        }

        for generated in ["id", "timestamp"] {
            if body.get(generated).is_none() {
                return CheckResult::fail(
                    check,
                    elapsed_ms(start),
                    ContractViolation::MissingField(generated.to_string()).into(),
                );
            }
        }

        let id = body
            .get("id")
            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
            .unwrap_or_default();

        debug!("Submitted status got id {id}, verifying listing round trip");

        let listing = match api.list_status().await {
            Ok(resp) => resp,
            Err(e) => return CheckResult::error(check, elapsed_ms(start), e.to_string()),
        };

        let records = match listing.json().map(|v| v.as_array().cloned()) {
            Ok(Some(records)) => records,
            Ok(None) => {
                return CheckResult::fail(
                    check,
                    elapsed_ms(start),
                    ContractViolation::WrongShape("listing is not a sequence".to_string()).into(),
                )
            }
            Err(e) => {
                return CheckResult::error(
                    check,
                    elapsed_ms(start),
                    format!("malformed listing body: {e}"),
                )
            }
        };

        let occurrences = records
            .iter()
            .filter(|record| {
                record
                    .get("id")
                    .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                    .as_deref()
                    == Some(id.as_str())
            })
            .count();

        if occurrences != 1 {
            return CheckResult::fail(
                check,
                elapsed_ms(start),
                ContractViolation::UnexpectedBody(format!(
                    "submitted id `{id}` appears {occurrences} times in the listing, expected exactly once"
                ))
                .into(),
            );
        }

        CheckResult::pass(check, elapsed_ms(start))
            .with_message(format!("id `{id}` echoed and listed exactly once"))
    }
}

/// Check 3: the listing endpoint returns a sequence, and two consecutive
/// reads with no intervening insert agree on count and id set.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatusListCheck;

impl StatusListCheck {
    pub async fn run(&self, api: &StatusApi) -> CheckResult {
        info!("Running Status Listing check");
        let start = Instant::now();
        let check = CheckCase::StatusList;

        let first = match self.fetch_ids(api).await {
            Ok(ids) => ids,
            Err(failure) => return failure.into_result(check, elapsed_ms(start)),
        };

        let second = match self.fetch_ids(api).await {
            Ok(ids) => ids,
            Err(failure) => return failure.into_result(check, elapsed_ms(start)),
        };

        if first != second {
            return CheckResult::fail(
                check,
                elapsed_ms(start),
                ContractViolation::UnexpectedBody(format!(
                    "listing changed between consecutive reads ({} vs {} records)",
                    first.len(),
                    second.len()
                ))
                .into(),
            );
        }

        CheckResult::pass(check, elapsed_ms(start)).with_message(format!(
            "{} records, stable across consecutive reads",
            first.len()
        ))
    }

    async fn fetch_ids(&self, api: &StatusApi) -> Result<Vec<String>, ListFailure> {
        let response = api
            .list_status()
            .await
            .map_err(|e| ListFailure::Transport(e.to_string()))?;

        if response.status_code != 200 {
            return Err(ListFailure::Contract(ContractViolation::UnexpectedStatus(
                response.status_code,
            )));
        }

        let body = response
            .json()
            .map_err(|e| ListFailure::Transport(format!("malformed listing body: {e}")))?;

        if !body.is_array() {
            return Err(ListFailure::Contract(ContractViolation::WrongShape(
                "listing is not a sequence".to_string(),
            )));
        }

        let records: Vec<StatusRecord> = serde_json::from_value(body).map_err(|e| {
            ListFailure::Contract(ContractViolation::WrongShape(format!(
                "listing entries are not status records: {e}"
            )))
        })?;

        let mut ids: Vec<String> = records.into_iter().map(|record| record.id).collect();
        ids.sort();
        Ok(ids)
    }
}

enum ListFailure {
    Transport(String),
    Contract(ContractViolation),
}

impl ListFailure {
    fn into_result(self, check: CheckCase, duration_ms: u64) -> CheckResult {
        match self {
            ListFailure::Transport(message) => CheckResult::error(check, duration_ms, message),
            ListFailure::Contract(violation) => {
                CheckResult::fail(check, duration_ms, CheckFailure::Contract(violation))
            }
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
