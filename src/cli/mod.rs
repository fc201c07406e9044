//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

/// Contract verification harness for the waitlist status API and record store
#[derive(Parser, Debug)]
#[command(name = "waitlist-probe")]
#[command(version = "0.1.0")]
#[command(about = "Verify the status API and waitlist record store contracts")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every contract check
    Run(ProbeArgs),

    /// Run the status API checks only
    Status(ProbeArgs),

    /// Run the record store checks only
    Store(ProbeArgs),

    /// Run the declared-schema check only
    Schema(ProbeArgs),

    /// List available checks
    List(ListArgs),

    /// Show or explain configuration
    Config(ConfigArgs),
}

/// Arguments shared by the probing commands
#[derive(Parser, Debug)]
pub struct ProbeArgs {
    /// Schema revision to verify against (current, legacy)
    #[arg(short, long, default_value = "current")]
    pub revision: String,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Client name submitted to the status endpoint
    #[arg(short, long, default_value = "TestClient")]
    pub client_name: String,

    /// Per-call timeout in seconds
    #[arg(short, long, default_value = "10")]
    pub timeout: u64,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show detailed check information
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved connection configuration
    Show,

    /// Explain the environment variables the harness consumes
    Env,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["waitlist-probe", "list", "--detailed"]);
        match args.command {
            Command::List(list_args) => {
                assert!(list_args.detailed);
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_probe_args_defaults() {
        let args = Args::parse_from(["waitlist-probe", "run"]);
        match args.command {
            Command::Run(probe_args) => {
                assert_eq!(probe_args.revision, "current");
                assert_eq!(probe_args.format, "table");
                assert_eq!(probe_args.client_name, "TestClient");
                assert_eq!(probe_args.timeout, 10);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_probe_args_overrides() {
        let args = Args::parse_from([
            "waitlist-probe",
            "store",
            "--revision",
            "legacy",
            "--format",
            "json",
            "--timeout",
            "30",
        ]);
        match args.command {
            Command::Store(probe_args) => {
                assert_eq!(probe_args.revision, "legacy");
                assert_eq!(probe_args.format, "json");
                assert_eq!(probe_args.timeout, 30);
            }
            _ => panic!("Expected Store command"),
        }
    }

    #[test]
    fn test_config_subcommand() {
        let args = Args::parse_from(["waitlist-probe", "config", "env"]);
        match args.command {
            Command::Config(config_args) => {
                assert!(matches!(config_args.action, ConfigAction::Env));
            }
            _ => panic!("Expected Config command"),
        }
    }
}
