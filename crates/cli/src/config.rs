//! Runtime configuration: optional TOML file plus environment overrides.
//!
//! ```toml
//! [tracker]
//! username = "buildmaster"
//! password = "..."
//! timeout_secs = 30
//!
//! [handoff]
//! directory = "/var/tmp/relgate"
//! ```
//!
//! `RELGATE_TRACKER_USERNAME`, `RELGATE_TRACKER_PASSWORD` and
//! `RELGATE_HANDOFF_DIR` win over the file when set and non-empty.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use release::TrackerCredentials;
use serde::Deserialize;

/// Config file read when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "relgate.toml";

const ENV_USERNAME: &str = "RELGATE_TRACKER_USERNAME";
const ENV_PASSWORD: &str = "RELGATE_TRACKER_PASSWORD";
const ENV_HANDOFF_DIR: &str = "RELGATE_HANDOFF_DIR";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    tracker: TrackerSection,
    #[serde(default)]
    handoff: HandoffSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TrackerSection {
    username: Option<String>,
    password: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct HandoffSection {
    directory: Option<PathBuf>,
}

/// Validated configuration for one invocation.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Tracker credentials; `None` when neither file nor environment set them.
    pub credentials: Option<TrackerCredentials>,
    /// Per-request tracker timeout.
    pub timeout: Duration,
    /// Directory holding handoff records.
    pub handoff_dir: PathBuf,
}

impl AppConfig {
    /// Loads configuration from `path` (must exist), or from
    /// [`DEFAULT_CONFIG_FILE`] when present, then applies the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => read_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                read_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => FileConfig::default(),
        };
        Self::from_sources(file, |name| std::env::var(name).ok())
    }

    fn from_sources(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let username = env(ENV_USERNAME).or(file.tracker.username);
        let password = env(ENV_PASSWORD).or(file.tracker.password);
        let credentials = match (username, password) {
            (Some(user), Some(pass)) => Some(TrackerCredentials::new(user, pass)),
            (None, None) => None,
            (Some(_), None) => bail!("tracker username is configured but the password is not"),
            (None, Some(_)) => bail!("tracker password is configured but the username is not"),
        };

        let timeout = match file.tracker.timeout_secs {
            Some(0) => bail!("tracker.timeout_secs must be greater than 0"),
            Some(secs) => Duration::from_secs(secs),
            None => jira::DEFAULT_TIMEOUT,
        };

        let handoff_dir = env(ENV_HANDOFF_DIR)
            .map(PathBuf::from)
            .or(file.handoff.directory)
            .unwrap_or_else(std::env::temp_dir);

        Ok(Self {
            credentials,
            timeout,
            handoff_dir,
        })
    }
}

fn read_file(path: &Path) -> Result<FileConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid config file {}", path.display()))
}
