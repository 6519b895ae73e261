//! Shared value types for the release domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! values that participate in release decisions (issue counts, release state,
//! run mode) or describe tracker entities as this system consumes them.

use chrono::{DateTime, NaiveDate, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{ProjectKey, VersionName, VersionRef};

// ---------------------------------------------------------------------------
// Build metadata
// ---------------------------------------------------------------------------

/// Raw per-invocation facts supplied by the build-metadata provider.
///
/// Nothing here is validated; [`crate::BuildContext::resolve`] turns it into
/// the facts the workflows actually consume.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildMetadata {
    /// Version declared by the build, possibly with a `-SNAPSHOT` marker.
    pub declared_version: String,

    /// Issue-management system declared by the build (e.g. `"JIRA"`).
    pub tracker_system: Option<String>,

    /// Issue-browsing URL declared by the build
    /// (e.g. `"https://issues.example.com/browse/ABC"`).
    pub tracker_url: Option<String>,
}

/// Where the project lives in the tracker, derived from the build's tracker URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerLocation {
    /// Trimmed tracker URL without its trailing slash.
    pub url: String,
    /// Project key taken from the last path segment of [`Self::url`].
    pub project_key: ProjectKey,
    /// Root endpoint of the tracker service.
    pub base_url: String,
}

// ---------------------------------------------------------------------------
// Tracker entities
// ---------------------------------------------------------------------------

/// A version as reported by the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerVersion {
    /// Version name, unique within its project.
    pub name: VersionName,
    /// Whether the version is marked as released.
    pub released: bool,
    /// Release date, if the tracker has one recorded.
    pub release_date: Option<NaiveDate>,
    /// Handle used for count and update calls.
    pub self_ref: VersionRef,
}

/// A project as reported by the tracker. Read-only to this system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerProject {
    /// Short project key.
    pub key: ProjectKey,
    /// Human-readable project name.
    pub name: String,
    /// Versions in tracker order (creation order for Jira).
    pub versions: Vec<TrackerVersion>,
}

/// Number of unresolved issues assigned to a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IssueCount(u64);

impl IssueCount {
    /// Creates an [`IssueCount`] from a raw integer.
    pub fn new(count: u64) -> Self {
        Self(count)
    }

    /// Returns `true` if no issues remain.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for IssueCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Configuration values
// ---------------------------------------------------------------------------

/// Fixed credentials used to authenticate against the tracker.
///
/// Threaded explicitly into the connector; the password is never rendered by
/// `Debug`.
#[derive(Debug, Clone)]
pub struct TrackerCredentials {
    username: String,
    password: SecretString,
}

impl TrackerCredentials {
    /// Creates a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Returns the user name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password. Callers must not log it.
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

/// Whether an invocation may touch the tracker and the handoff store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Normal operation.
    #[default]
    Live,
    /// Suppress every tracker call and handoff mutation.
    DryRun,
}

impl RunMode {
    /// Parses the free-form dry-run flag.
    ///
    /// Only `"true"` (case-insensitive, surrounding whitespace ignored) selects
    /// [`RunMode::DryRun`]; every other value, and absence, means
    /// [`RunMode::Live`].
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            Some(value) if value.trim().eq_ignore_ascii_case("true") => Self::DryRun,
            _ => Self::Live,
        }
    }

    /// Returns `true` for [`RunMode::DryRun`].
    pub fn is_dry_run(self) -> bool {
        self == Self::DryRun
    }
}

// ---------------------------------------------------------------------------
// Operation outcomes
// ---------------------------------------------------------------------------

/// Result of marking a version as released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// The version was unreleased and is now released.
    Marked,
    /// The version was already released; its release date was refreshed.
    AlreadyReleased,
}

/// Result of asking for a version to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The tracker created the version.
    Created(TrackerVersion),
    /// A version with that exact name was already present; nothing was sent.
    AlreadyExisted(TrackerVersion),
}

impl CreateOutcome {
    /// Returns the version, whichever way it came to exist.
    pub fn version(&self) -> &TrackerVersion {
        match self {
            Self::Created(v) | Self::AlreadyExisted(v) => v,
        }
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Calendar date used as the tracker's release date.
    pub fn date(self) -> NaiveDate {
        self.0.date_naive()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
