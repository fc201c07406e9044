//! waitlist-probe - Endpoint Contract Verifier
//!
//! A CLI harness that verifies two externally-owned HTTP services: a small
//! status API and a policy-governed waitlist record store.
//!
//! ## Features
//!
//! - 10 contract checks covering the status endpoints and the
//!   record-insertion contract
//! - Versioned expected-schema table (`current` and `legacy` revisions)
//! - Access-policy denial diagnostics with remediation categories
//! - Multiple output formats (Table, JSON, CSV, summary)
//!
//! ## Usage
//!
//! ```bash
//! # Run every check
//! waitlist-probe run
//!
//! # Verify only the record store, against the legacy schema revision
//! waitlist-probe store --revision legacy
//!
//! # Check the declared schema alone
//! waitlist-probe schema
//!
//! # List available checks
//! waitlist-probe list --detailed
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod checks;
mod cli;
mod config;
mod http;
mod models;
mod output;
mod runner;
mod schema;

use cli::Args;
use config::{ConnectionConfig, EnvProvider};
use models::CheckCase;
use output::{OutputFormat, ResultFormatter};
use runner::Harness;
use schema::SchemaRevision;

/// Which slice of the check set a command runs.
enum Scope {
    All,
    Status,
    Store,
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_target(false)
        .compact()
        .init();

    match args.command {
        cli::Command::Run(probe_args) => {
            run_checks(probe_args, Scope::All).await?;
        }
        cli::Command::Status(probe_args) => {
            run_checks(probe_args, Scope::Status).await?;
        }
        cli::Command::Store(probe_args) => {
            run_checks(probe_args, Scope::Store).await?;
        }
        cli::Command::Schema(probe_args) => {
            run_checks(probe_args, Scope::Schema).await?;
        }
        cli::Command::List(list_args) => {
            list_checks(list_args);
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args)?;
        }
    }

    Ok(())
}

async fn run_checks(args: cli::ProbeArgs, scope: Scope) -> Result<()> {
    let revision = SchemaRevision::from_str(&args.revision)
        .ok_or_else(|| anyhow::anyhow!("Unknown revision: {}", args.revision))?;

    // Configuration resolution is fail-fast: a missing variable aborts here,
    // before any network call.
    let config = ConnectionConfig::resolve(&EnvProvider)?;

    info!(
        "Verifying {} / {} (key {})",
        config.base_api_url,
        config.store_url,
        config.key_preview()
    );

    let formatter =
        ResultFormatter::new(OutputFormat::from_str(&args.format).unwrap_or(OutputFormat::Table));

    let harness = Harness::new(config, revision)
        .with_client_name(&args.client_name)
        .with_timeout(args.timeout);

    let summary = match scope {
        Scope::All => harness.run_all().await?,
        Scope::Status => harness.run_status().await?,
        Scope::Store => harness.run_store().await?,
        Scope::Schema => harness.run_schema().await?,
    };

    println!("{}", formatter.format_summary(&summary));

    if summary.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

fn list_checks(args: cli::ListArgs) {
    println!("\nContract Checks (10 total)\n");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let mut current_category = "";

    for check in CheckCase::all() {
        let category = check.category();
        if category != current_category {
            if !current_category.is_empty() {
                println!();
            }
            println!("\n{category} Checks:");
            println!("──────────────────────────────────────────────────────────────────────");
            current_category = category;
        }

        if args.detailed {
            println!(
                "  {:2}. {:20} [{}]",
                check.number(),
                check.name(),
                check.category()
            );
        } else {
            println!("  {:2}. {}", check.number(), check.name());
        }
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    println!("Schema Revisions:\n");
    for revision in SchemaRevision::all() {
        println!(
            "  - {:10} columns: {}",
            revision.name(),
            revision.expected_columns().join(", ")
        );
    }
    println!();
}

fn manage_config(args: cli::ConfigArgs) -> Result<()> {
    match args.action {
        cli::ConfigAction::Show => {
            let config = ConnectionConfig::resolve(&EnvProvider)?;
            config.print_summary();
        }
        cli::ConfigAction::Env => {
            config::env::print_env_help();
        }
    }

    Ok(())
}
