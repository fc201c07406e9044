//! Harness runner
//!
//! Executes the contract checks sequentially in a fixed order. There is no
//! parallelism and no retry: each check is one blocking round trip, and a
//! denial or violation is recorded, not retried. Dependent checks are
//! skipped when their prerequisite failed.

use anyhow::Result;
use tracing::{error, info};

use crate::checks::{
    BracketSweepCheck, FieldEchoCheck, InsertPermissionCheck, ReadAccessCheck, RootGreetingCheck,
    SchemaCheck, StatusListCheck, StatusSubmitCheck, StoreReachableCheck, TableVisibleCheck,
};
use crate::config::ConnectionConfig;
use crate::http::{RecordStore, StatusApi, DEFAULT_TIMEOUT_SECS};
use crate::models::{CheckCase, CheckResult, CheckStatus, RunSummary, WaitlistRecord};
use crate::schema::SchemaRevision;

/// Default client name submitted to the status endpoint.
pub const DEFAULT_CLIENT_NAME: &str = "TestClient";

/// Sequential contract-check runner.
pub struct Harness {
    config: ConnectionConfig,
    revision: SchemaRevision,
    client_name: String,
    timeout_secs: u64,
}

impl Harness {
    pub fn new(config: ConnectionConfig, revision: SchemaRevision) -> Self {
        Self {
            config,
            revision,
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_client_name(mut self, client_name: impl Into<String>) -> Self {
        self.client_name = client_name.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Run every check against both services.
    pub async fn run_all(&self) -> Result<RunSummary> {
        info!(
            "Starting contract run against {} (revision {})",
            self.config.base_api_url, self.revision
        );

        let mut results = self.status_checks().await?;
        results.extend(self.store_checks().await?);

        let summary = RunSummary::new(self.revision.name(), results);
        self.log_outcome(&summary);
        Ok(summary)
    }

    /// Run the status API checks only.
    pub async fn run_status(&self) -> Result<RunSummary> {
        let results = self.status_checks().await?;
        let summary = RunSummary::new(self.revision.name(), results);
        self.log_outcome(&summary);
        Ok(summary)
    }

    /// Run the record store checks only.
    pub async fn run_store(&self) -> Result<RunSummary> {
        let results = self.store_checks().await?;
        let summary = RunSummary::new(self.revision.name(), results);
        self.log_outcome(&summary);
        Ok(summary)
    }

    /// Run the declared-schema check only.
    pub async fn run_schema(&self) -> Result<RunSummary> {
        let store = RecordStore::new(&self.config, self.timeout_secs)?;
        let result = SchemaCheck::new(self.revision).run(&store).await;
        info!("  {}", result);

        let summary = RunSummary::new(self.revision.name(), vec![result]);
        self.log_outcome(&summary);
        Ok(summary)
    }

    async fn status_checks(&self) -> Result<Vec<CheckResult>> {
        let api = StatusApi::new(&self.config, self.timeout_secs)?;
        let mut results = Vec::new();

        let result = RootGreetingCheck::default().run(&api).await;
        info!("  {}", result);
        results.push(result);

        let result = StatusSubmitCheck::new(&self.client_name).run(&api).await;
        info!("  {}", result);
        results.push(result);

        let result = StatusListCheck.run(&api).await;
        info!("  {}", result);
        results.push(result);

        Ok(results)
    }

    async fn store_checks(&self) -> Result<Vec<CheckResult>> {
        let store = RecordStore::new(&self.config, self.timeout_secs)?;
        let mut results = Vec::new();

        let reachability = StoreReachableCheck.run(&store).await;
        info!("  {}", reachability);
        let reachable = reachability.status == CheckStatus::Pass;
        results.push(reachability);

        if !reachable {
            // Nothing downstream is meaningful without a reachable store.
            error!("Store unreachable, skipping remaining store checks");
            for check in [
                CheckCase::TableVisible,
                CheckCase::StoreSchema,
                CheckCase::ReadAccess,
                CheckCase::InsertPermission,
                CheckCase::FieldEcho,
                CheckCase::BracketSweep,
            ] {
                results.push(CheckResult::skip(check, "store unreachable"));
            }
            return Ok(results);
        }

        let result = TableVisibleCheck.run(&store).await;
        info!("  {}", result);
        results.push(result);

        let result = SchemaCheck::new(self.revision).run(&store).await;
        info!("  {}", result);
        results.push(result);

        let result = ReadAccessCheck.run(&store).await;
        info!("  {}", result);
        results.push(result);

        let record = WaitlistRecord::sample();
        let (insert_result, echoed_rows) = InsertPermissionCheck::new(record.clone(), self.revision)
            .run(&store)
            .await;
        info!("  {}", insert_result);
        let insert_denied = insert_result.status == CheckStatus::Denied;
        results.push(insert_result);

        match echoed_rows {
            Some(rows) => {
                let result = FieldEchoCheck::new(record.clone(), self.revision).verify(&rows);
                info!("  {}", result);
                results.push(result);
            }
            None => {
                let reason = if insert_denied {
                    "insert denied"
                } else {
                    "insert not accepted"
                };
                let result = CheckResult::skip(CheckCase::FieldEcho, reason);
                info!("  {}", result);
                results.push(result);
            }
        }

        if insert_denied {
            // Further inserts would only repeat the same denial.
            let result = CheckResult::skip(CheckCase::BracketSweep, "insert denied");
            info!("  {}", result);
            results.push(result);
        } else {
            let result = BracketSweepCheck::new(record, self.revision).run(&store).await;
            info!("  {}", result);
            results.push(result);
        }

        Ok(results)
    }

    fn log_outcome(&self, summary: &RunSummary) {
        info!(
            "Run completed in {}ms - Pass: {}/{} ({:.1}%)",
            summary.total_duration_ms,
            summary.passed,
            summary.total,
            summary.pass_rate()
        );
        for line in summary.remediation_lines() {
            info!("remediation: {line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StaticProvider, BACKEND_URL_VAR, STORE_KEY_VAR, STORE_URL_VAR};

    fn test_config() -> ConnectionConfig {
        let provider = StaticProvider::new()
            .with(BACKEND_URL_VAR, "https://app.test")
            .with(STORE_URL_VAR, "https://store.test")
            .with(STORE_KEY_VAR, "anon-key");
        ConnectionConfig::resolve(&provider).unwrap()
    }

    #[test]
    fn test_harness_builder() {
        let harness = Harness::new(test_config(), SchemaRevision::Current)
            .with_client_name("Probe")
            .with_timeout(5);

        assert_eq!(harness.client_name, "Probe");
        assert_eq!(harness.timeout_secs, 5);
        assert_eq!(harness.revision, SchemaRevision::Current);
    }

    #[test]
    fn test_default_client_name() {
        let harness = Harness::new(test_config(), SchemaRevision::Legacy);
        assert_eq!(harness.client_name, DEFAULT_CLIENT_NAME);
        assert_eq!(harness.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    mod end_to_end {
        use super::*;
        use crate::checks::testutil::{config_for, spawn_backend, StubOptions};

        #[tokio::test]
        async fn test_full_run_against_conformant_backend() {
            let base = spawn_backend(StubOptions::default());
            let harness = Harness::new(config_for(&base), SchemaRevision::Current);

            let summary = harness.run_all().await.unwrap();
            assert_eq!(summary.total, 10);
            assert_eq!(summary.passed, 10, "{summary}");
            assert!(!summary.has_failures());
        }

        #[tokio::test]
        async fn test_denied_insert_run_continues_with_remediation() {
            let base = spawn_backend(StubOptions {
                deny_insert: true,
                ..StubOptions::default()
            });
            let harness = Harness::new(config_for(&base), SchemaRevision::Current);

            let summary = harness.run_store().await.unwrap();

            // The denial is recorded, the dependent checks are skipped, and
            // the run still completes with a summary.
            assert_eq!(summary.total, 7);
            assert_eq!(summary.denied, 1);
            assert_eq!(summary.skipped, 2);
            assert!(summary.has_failures());
            assert!(!summary.remediation_lines().is_empty());

            let insert = summary
                .results
                .iter()
                .find(|r| r.check == CheckCase::InsertPermission)
                .unwrap();
            assert_eq!(insert.status, CheckStatus::Denied);

            let echo = summary
                .results
                .iter()
                .find(|r| r.check == CheckCase::FieldEcho)
                .unwrap();
            assert_eq!(echo.status, CheckStatus::Skip);
        }

        #[tokio::test]
        async fn test_unreachable_store_skips_dependent_checks() {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            let base = format!("http://{}", listener.local_addr().unwrap());
            drop(listener);

            let harness =
                Harness::new(config_for(&base), SchemaRevision::Current).with_timeout(2);

            let summary = harness.run_store().await.unwrap();
            assert_eq!(summary.total, 7);
            assert_eq!(summary.errors, 1);
            assert_eq!(summary.skipped, 6);

            let reach = summary
                .results
                .iter()
                .find(|r| r.check == CheckCase::StoreReachable)
                .unwrap();
            assert_eq!(reach.status, CheckStatus::Error);
        }

        #[tokio::test]
        async fn test_schema_only_run() {
            let base = spawn_backend(StubOptions {
                schema_missing_role: true,
                ..StubOptions::default()
            });
            let harness = Harness::new(config_for(&base), SchemaRevision::Current);

            let summary = harness.run_schema().await.unwrap();
            assert_eq!(summary.total, 1);
            assert_eq!(summary.failed, 1);
            assert!(summary.has_failures());
        }
    }
}
