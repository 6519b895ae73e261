//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use release::BuildMetadata;

/// relgate - gate releases on the issue tracker and record them there.
#[derive(Parser, Debug)]
#[command(name = "relgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file (default: ./relgate.toml if present)
    #[arg(long, global = true, env = "RELGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Suppress all tracker calls and handoff changes. Only "true" enables it.
    #[arg(
        long = "dry-run",
        global = true,
        env = "RELGATE_DRY_RUN",
        value_name = "VALUE"
    )]
    pub dry_run: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check the release version has no unresolved issues and record it
    Verify(BuildArgs),

    /// Mark the recorded version released and create the next version
    Release(BuildArgs),
}

/// Project metadata of the build being released.
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Version declared by the build (e.g. 2.3.0-SNAPSHOT)
    #[arg(long, env = "RELGATE_PROJECT_VERSION")]
    pub project_version: String,

    /// Issue-management system of the build; only JIRA is acted on
    #[arg(long, env = "RELGATE_TRACKER_SYSTEM")]
    pub tracker_system: Option<String>,

    /// Issue-browsing URL, e.g. https://issues.example.com/browse/ABC
    #[arg(long, env = "RELGATE_TRACKER_URL")]
    pub tracker_url: Option<String>,
}

impl BuildArgs {
    pub fn metadata(&self) -> BuildMetadata {
        BuildMetadata {
            declared_version: self.project_version.clone(),
            tracker_system: self.tracker_system.clone(),
            tracker_url: self.tracker_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn dry_run_is_global_and_free_form() {
        let cli = Cli::try_parse_from([
            "relgate",
            "--dry-run",
            "yes",
            "verify",
            "--project-version",
            "1.0",
        ])
        .unwrap();
        assert_eq!(cli.dry_run.as_deref(), Some("yes"));
    }

    #[test]
    fn build_args_become_metadata() {
        let cli = Cli::try_parse_from([
            "relgate",
            "release",
            "--project-version",
            "2.4.0-SNAPSHOT",
            "--tracker-system",
            "JIRA",
            "--tracker-url",
            "https://issues.example.com/browse/ABC",
        ])
        .unwrap();
        let Command::Release(build) = cli.command else {
            panic!("expected release");
        };
        let metadata = build.metadata();
        assert_eq!(metadata.declared_version, "2.4.0-SNAPSHOT");
        assert_eq!(metadata.tracker_system.as_deref(), Some("JIRA"));
    }
}
