//! relgate CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse arguments**: the `verify` / `release` subcommand, the build's
//!    project metadata, and the global dry-run switch.
//! 2. **Wire observability**: configure `tracing-subscriber` (text or JSON)
//!    and, when requested through the environment, an OpenTelemetry OTLP
//!    exporter.
//! 3. **Load configuration**: tracker credentials, request timeout and the
//!    handoff directory from `relgate.toml` and the environment.
//! 4. **Construct infrastructure**: a `JiraConnector` and a
//!    `FileHandoffStore`, injected into the selected workflow.
//!
//! Any workflow error ends the process with a non-zero exit code and the
//! error's message on stderr.

mod args;
mod config;
mod observability;

use anyhow::{Context, Result};
use clap::Parser;
use handoff::FileHandoffStore;
use jira::JiraConnector;
use release::RunMode;
use tracing::{error, info};
use workflows::{Invocation, ReleaseOutcome, ReleaseWorkflow, VerifyOutcome, VerifyWorkflow};

use crate::args::{Cli, Command};
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _telemetry = observability::init(cli.log_format)?;

    let result = run(cli).await;
    if let Err(e) = &result {
        error!(error = %format!("{e:#}"), "relgate failed");
    }
    result
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let invocation = Invocation::new(RunMode::from_flag(cli.dry_run.as_deref()));
    let connector = JiraConnector::new(config.credentials.clone(), config.timeout);
    let store = FileHandoffStore::new(&config.handoff_dir);

    info!(
        invocation = %invocation.id,
        dry_run = invocation.mode.is_dry_run(),
        handoff_dir = %config.handoff_dir.display(),
        "relgate starting"
    );

    match cli.command {
        Command::Verify(build) => {
            let outcome = VerifyWorkflow::new(connector, store)
                .run(invocation, &build.metadata())
                .await
                .context("verify failed")?;
            match outcome {
                VerifyOutcome::DryRun => info!("verify skipped (dry run)"),
                VerifyOutcome::NoTracker => info!("verify skipped (no JIRA tracker configured)"),
                VerifyOutcome::Releasable {
                    project_key,
                    version,
                    ..
                } => info!(project = %project_key, version = %version, "verify passed"),
            }
        }
        Command::Release(build) => {
            let outcome = ReleaseWorkflow::new(connector, store)
                .run(invocation, &build.metadata())
                .await
                .context("release failed")?;
            match outcome {
                ReleaseOutcome::DryRun => info!("release skipped (dry run)"),
                ReleaseOutcome::NoTracker => info!("release skipped (no JIRA tracker configured)"),
                ReleaseOutcome::Released {
                    project_key,
                    released,
                    next,
                    ..
                } => info!(
                    project = %project_key,
                    released = %released,
                    next = %next.version().name,
                    "release recorded"
                ),
            }
        }
    }

    Ok(())
}
