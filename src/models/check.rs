//! Check cases, results, and run summaries
//!
//! Defines the fixed set of contract checks and their outcome types.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::fmt;

use super::failure::CheckFailure;

/// All 10 contract checks, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckCase {
    // Status API checks (1-3)
    RootGreeting,
    StatusSubmit,
    StatusList,

    // Record store checks (4-7)
    StoreReachable,
    TableVisible,
    StoreSchema,
    ReadAccess,

    // Insertion checks (8-10)
    InsertPermission,
    FieldEcho,
    BracketSweep,
}

impl CheckCase {
    /// Get check number (1-10)
    pub fn number(&self) -> u8 {
        match self {
            CheckCase::RootGreeting => 1,
            CheckCase::StatusSubmit => 2,
            CheckCase::StatusList => 3,
            CheckCase::StoreReachable => 4,
            CheckCase::TableVisible => 5,
            CheckCase::StoreSchema => 6,
            CheckCase::ReadAccess => 7,
            CheckCase::InsertPermission => 8,
            CheckCase::FieldEcho => 9,
            CheckCase::BracketSweep => 10,
        }
    }

    /// Get check name
    pub fn name(&self) -> &'static str {
        match self {
            CheckCase::RootGreeting => "Root Greeting",
            CheckCase::StatusSubmit => "Status Submit",
            CheckCase::StatusList => "Status Listing",
            CheckCase::StoreReachable => "Store Reachability",
            CheckCase::TableVisible => "Table Visibility",
            CheckCase::StoreSchema => "Declared Schema",
            CheckCase::ReadAccess => "Read Access",
            CheckCase::InsertPermission => "Insert Permission",
            CheckCase::FieldEcho => "Field Echo",
            CheckCase::BracketSweep => "Bracket Sweep",
        }
    }

    /// Get check category
    pub fn category(&self) -> &'static str {
        match self {
            CheckCase::RootGreeting | CheckCase::StatusSubmit | CheckCase::StatusList => {
                "Status API"
            }
            CheckCase::StoreReachable
            | CheckCase::TableVisible
            | CheckCase::StoreSchema
            | CheckCase::ReadAccess => "Record Store",
            _ => "Insertion",
        }
    }

    /// Get all checks in execution order
    pub fn all() -> Vec<CheckCase> {
        vec![
            CheckCase::RootGreeting,
            CheckCase::StatusSubmit,
            CheckCase::StatusList,
            CheckCase::StoreReachable,
            CheckCase::TableVisible,
            CheckCase::StoreSchema,
            CheckCase::ReadAccess,
            CheckCase::InsertPermission,
            CheckCase::FieldEcho,
            CheckCase::BracketSweep,
        ]
    }

    /// Parse from check number
    pub fn from_number(n: u8) -> Option<CheckCase> {
        match n {
            1 => Some(CheckCase::RootGreeting),
            2 => Some(CheckCase::StatusSubmit),
            3 => Some(CheckCase::StatusList),
            4 => Some(CheckCase::StoreReachable),
            5 => Some(CheckCase::TableVisible),
            6 => Some(CheckCase::StoreSchema),
            7 => Some(CheckCase::ReadAccess),
            8 => Some(CheckCase::InsertPermission),
            9 => Some(CheckCase::FieldEcho),
            10 => Some(CheckCase::BracketSweep),
            _ => None,
        }
    }
}

impl fmt::Display for CheckCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Check {}: {}", self.number(), self.name())
    }
}

/// Check execution status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    /// Contract or schema expectations violated.
    Fail,
    /// Explicitly rejected by access-control rules; diagnosable, not a bug.
    Denied,
    /// Transport-level failure before the contract could be evaluated.
    Error,
    Skip,
}

impl CheckStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "✓",
            CheckStatus::Fail => "✗",
            CheckStatus::Denied => "⚠",
            CheckStatus::Error => "!",
            CheckStatus::Skip => "○",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CheckStatus::Pass)
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Pass => write!(f, "PASS"),
            CheckStatus::Fail => write!(f, "FAIL"),
            CheckStatus::Denied => write!(f, "DENIED"),
            CheckStatus::Error => write!(f, "ERROR"),
            CheckStatus::Skip => write!(f, "SKIP"),
        }
    }
}

/// Result of a single check execution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckResult {
    pub check: CheckCase,
    pub status: CheckStatus,
    pub duration_ms: u64,
    pub message: Option<String>,
    pub failure: Option<CheckFailure>,
}

impl CheckResult {
    pub fn pass(check: CheckCase, duration_ms: u64) -> Self {
        Self {
            check,
            status: CheckStatus::Pass,
            duration_ms,
            message: None,
            failure: None,
        }
    }

    pub fn fail(check: CheckCase, duration_ms: u64, failure: CheckFailure) -> Self {
        Self {
            check,
            status: CheckStatus::Fail,
            duration_ms,
            message: Some(failure.to_string()),
            failure: Some(failure),
        }
    }

    pub fn denied(check: CheckCase, duration_ms: u64, failure: CheckFailure) -> Self {
        Self {
            check,
            status: CheckStatus::Denied,
            duration_ms,
            message: Some(failure.to_string()),
            failure: Some(failure),
        }
    }

    pub fn error(check: CheckCase, duration_ms: u64, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            check,
            status: CheckStatus::Error,
            duration_ms,
            message: Some(message.clone()),
            failure: Some(CheckFailure::Transport { message }),
        }
    }

    pub fn skip(check: CheckCase, reason: impl Into<String>) -> Self {
        Self {
            check,
            status: CheckStatus::Skip,
            duration_ms: 0,
            message: Some(reason.into()),
            failure: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}ms]",
            self.status.symbol(),
            self.check,
            self.duration_ms
        )?;
        if let Some(msg) = &self.message {
            write!(f, " - {msg}")?;
        }
        Ok(())
    }
}

/// Summary of a harness run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub revision: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub denied: usize,
    pub errors: usize,
    pub skipped: usize,
    pub total_duration_ms: u64,
    pub results: Vec<CheckResult>,
}

impl RunSummary {
    pub fn new(revision: impl Into<String>, results: Vec<CheckResult>) -> Self {
        let total = results.len();
        let passed = results
            .iter()
            .filter(|r| r.status == CheckStatus::Pass)
            .count();
        let failed = results
            .iter()
            .filter(|r| r.status == CheckStatus::Fail)
            .count();
        let denied = results
            .iter()
            .filter(|r| r.status == CheckStatus::Denied)
            .count();
        let errors = results
            .iter()
            .filter(|r| r.status == CheckStatus::Error)
            .count();
        let skipped = results
            .iter()
            .filter(|r| r.status == CheckStatus::Skip)
            .count();
        let total_duration_ms = results.iter().map(|r| r.duration_ms).sum();

        Self {
            revision: revision.into(),
            total,
            passed,
            failed,
            denied,
            errors,
            skipped,
            total_duration_ms,
            results,
        }
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }

    /// Whether the run contains any failing verdicts. Denials count as
    /// failures for the verdict even though they are diagnosable.
    pub fn has_failures(&self) -> bool {
        self.failed + self.denied + self.errors > 0
    }

    /// One remediation line per denied check.
    pub fn remediation_lines(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|r| {
                let remediation = r.failure.as_ref()?.remediation()?;
                Some(format!("{}: {}", r.check.name(), remediation))
            })
            .collect()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Contract run - revision {}", self.revision)?;
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        for result in &self.results {
            writeln!(f, "  {result}")?;
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "Total: {} | Pass: {} | Fail: {} | Denied: {} | Error: {} | Skip: {}",
            self.total, self.passed, self.failed, self.denied, self.errors, self.skipped
        )?;
        writeln!(
            f,
            "Pass Rate: {:.1}% | Duration: {}ms",
            self.pass_rate(),
            self.total_duration_ms
        )?;
        for line in self.remediation_lines() {
            writeln!(f, "remediation: {line}")?;
        }
        Ok(())
    }
}
