//! Data models for the contract verification harness
//!
//! This module contains all data structures used throughout the application.

mod check;
mod failure;
mod record;

pub use check::{CheckCase, CheckResult, CheckStatus, RunSummary};
pub use failure::{CheckFailure, ContractViolation, DenialCause, RemediationCategory};
pub use record::{unique_email, StatusRecord, WaitlistRecord};
