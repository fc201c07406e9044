//! Output formatters for check results
//!
//! Provides JSON, Table, CSV, and summary output formats.

#![allow(dead_code)]

use crate::models::{CheckResult, CheckStatus, RunSummary};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Csv,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Format a single check result
    pub fn format_result(&self, result: &CheckResult) -> String {
        match self.format {
            OutputFormat::Table => self.format_result_table(result),
            OutputFormat::Json => serde_json::to_string(result).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(result).unwrap_or_default(),
            OutputFormat::Csv => self.format_result_csv(result),
            OutputFormat::Summary => self.format_result_brief(result),
        }
    }

    fn status_str(&self, status: CheckStatus) -> String {
        let plain = format!("{} {}", status.symbol(), status);
        if !self.colorize {
            return plain;
        }
        match status {
            CheckStatus::Pass => format!("\x1b[32m{plain}\x1b[0m"),
            CheckStatus::Fail | CheckStatus::Error => format!("\x1b[31m{plain}\x1b[0m"),
            CheckStatus::Denied | CheckStatus::Skip => format!("\x1b[33m{plain}\x1b[0m"),
        }
    }

    fn format_result_table(&self, result: &CheckResult) -> String {
        format!(
            "{:2}. {:20} {} [{:>6}ms]",
            result.check.number(),
            result.check.name(),
            self.status_str(result.status),
            result.duration_ms
        )
    }

    fn format_result_csv(&self, result: &CheckResult) -> String {
        format!(
            "{},{},{},{},\"{}\"",
            result.check.number(),
            result.check.name(),
            result.status,
            result.duration_ms,
            result.message.as_deref().unwrap_or("").replace('"', "\"\"")
        )
    }

    fn format_result_brief(&self, result: &CheckResult) -> String {
        format!(
            "{} {} ({}ms)",
            result.status.symbol(),
            result.check.name(),
            result.duration_ms
        )
    }

    /// Format a full run summary
    pub fn format_summary(&self, summary: &RunSummary) -> String {
        match self.format {
            OutputFormat::Table => self.format_summary_table(summary),
            OutputFormat::Json => serde_json::to_string(summary).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(summary).unwrap_or_default(),
            OutputFormat::Csv => self.format_summary_csv(summary),
            OutputFormat::Summary => self.format_summary_brief(summary),
        }
    }

    fn format_summary_table(&self, summary: &RunSummary) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\nContract Checks - revision {}\n",
            summary.revision
        ));
        output.push_str(
            "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n",
        );

        let mut current_category = "";
        for result in &summary.results {
            let category = result.check.category();
            if category != current_category {
                output.push_str(&format!("\n{category}:\n"));
                current_category = category;
            }
            output.push_str(&format!("  {}\n", self.format_result_table(result)));
            if result.status != CheckStatus::Pass {
                if let Some(msg) = &result.message {
                    output.push_str(&format!("      {msg}\n"));
                }
            }
        }

        output.push_str(
            "\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n",
        );
        output.push_str(&format!(
            "Total: {} | Pass: {} | Fail: {} | Denied: {} | Error: {} | Skip: {}\n",
            summary.total,
            summary.passed,
            summary.failed,
            summary.denied,
            summary.errors,
            summary.skipped
        ));
        output.push_str(&format!(
            "Pass Rate: {:.1}% | Duration: {}ms\n",
            summary.pass_rate(),
            summary.total_duration_ms
        ));

        let remediation = summary.remediation_lines();
        if !remediation.is_empty() {
            output.push_str("\nRemediation:\n");
            for line in remediation {
                output.push_str(&format!("  - {line}\n"));
            }
        }

        output
    }

    fn format_summary_csv(&self, summary: &RunSummary) -> String {
        let mut output = String::from("number,name,status,duration_ms,message\n");
        for result in &summary.results {
            output.push_str(&self.format_result_csv(result));
            output.push('\n');
        }
        output
    }

    fn format_summary_brief(&self, summary: &RunSummary) -> String {
        format!(
            "revision {}: {}/{} passed ({:.1}%), {} denied, {} errors",
            summary.revision,
            summary.passed,
            summary.total,
            summary.pass_rate(),
            summary.denied,
            summary.errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CheckCase, CheckFailure, DenialCause};

    fn sample_summary() -> RunSummary {
        RunSummary::new(
            "current",
            vec![
                CheckResult::pass(CheckCase::RootGreeting, 12),
                CheckResult::denied(
                    CheckCase::InsertPermission,
                    30,
                    CheckFailure::Policy {
                        operation: "insert".to_string(),
                        cause: DenialCause::NoInsertPolicy,
                    },
                ),
            ],
        )
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(OutputFormat::from_str("table"), Some(OutputFormat::Table));
        assert_eq!(
            OutputFormat::from_str("json-pretty"),
            Some(OutputFormat::JsonPretty)
        );
        assert_eq!(OutputFormat::from_str("xml"), None);
    }

    #[test]
    fn test_table_summary_contains_remediation() {
        let formatter = ResultFormatter::new(OutputFormat::Table).no_color();
        let output = formatter.format_summary(&sample_summary());

        assert!(output.contains("Status API:"));
        assert!(output.contains("Remediation:"));
        assert!(output.contains("allow rule"));
    }

    #[test]
    fn test_json_summary_round_trips() {
        let formatter = ResultFormatter::new(OutputFormat::Json);
        let output = formatter.format_summary(&sample_summary());

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["total"], 2);
        assert_eq!(parsed["denied"], 1);
    }

    #[test]
    fn test_csv_escapes_quotes() {
        let formatter = ResultFormatter::new(OutputFormat::Csv);
        let result = CheckResult::pass(CheckCase::RootGreeting, 5)
            .with_message("greeting \"Hello World\" matched");
        let line = formatter.format_result(&result);

        assert!(line.contains("\"\"Hello World\"\""));
    }

    #[test]
    fn test_brief_summary() {
        let formatter = ResultFormatter::new(OutputFormat::Summary);
        let output = formatter.format_summary(&sample_summary());
        assert!(output.starts_with("revision current: 1/2 passed"));
    }
}
