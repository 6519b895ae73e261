//! Port traits implemented by the infrastructure crates.
//!
//! - [`TrackerConnector`] / [`IssueTracker`]: the remote issue tracker
//!   (implemented by the `jira` crate).
//! - [`HandoffStore`]: durable verify→release record (implemented by the
//!   `handoff` crate).
//!
//! Each port owns its component error type; both convert into
//! [`crate::ReleaseGateError`].

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    IssueCount, ProjectKey, Timestamp, TrackerLocation, TrackerProject, TrackerVersion,
    VersionName, VersionRef,
};

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Result type for tracker adapter calls.
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Failures reported by a tracker adapter.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The adapter cannot be built from the supplied configuration.
    #[error("tracker configuration error: {0}")]
    Configuration(String),

    /// The tracker rejected the credentials.
    #[error("tracker authentication failed ({status}): {message}")]
    Authentication {
        /// HTTP status code returned by the tracker.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The request never produced a response.
    #[error("tracker transport error: {0}")]
    Transport(String),

    /// The tracker answered with a non-success status.
    #[error("tracker API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the tracker.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The response payload could not be decoded.
    #[error("tracker payload could not be parsed: {0}")]
    Parse(String),
}

/// Authenticated handle on the issue tracker.
///
/// Every call blocks the invocation until the tracker answers; timeouts are the
/// adapter's transport concern.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Looks up a project with all of its versions.
    ///
    /// Returns `Ok(None)` when the tracker reports no such project.
    async fn project(&self, key: &ProjectKey) -> TrackerResult<Option<TrackerProject>>;

    /// Counts unresolved issues assigned to the version.
    async fn unresolved_issue_count(&self, version: &VersionRef) -> TrackerResult<IssueCount>;

    /// Sets `released = true` and the release date on the version.
    async fn release_version(&self, version: &VersionRef, released_at: Timestamp)
        -> TrackerResult<()>;

    /// Creates a new, unreleased version in the project.
    async fn create_version(
        &self,
        project: &ProjectKey,
        name: &VersionName,
    ) -> TrackerResult<TrackerVersion>;
}

/// Produces an [`IssueTracker`] for a tracker location.
///
/// Credentials are part of the connector's own configuration; they are not
/// per-invocation input.
#[async_trait]
pub trait TrackerConnector: Send + Sync {
    /// Client type handed out by this connector.
    type Client: IssueTracker;

    /// Opens an authenticated client against `location.base_url`.
    ///
    /// Fails fast on configuration or authentication problems.
    async fn connect(&self, location: &TrackerLocation) -> TrackerResult<Self::Client>;
}

// ---------------------------------------------------------------------------
// Handoff
// ---------------------------------------------------------------------------

/// Failures reported by a [`HandoffStore`].
#[derive(Debug, Error)]
pub enum HandoffError {
    /// No record exists for the project; verify has not run (or was consumed).
    #[error("no handoff record for project '{project_key}' at {location}")]
    Missing {
        /// Project whose record was requested.
        project_key: ProjectKey,
        /// Where the record was expected.
        location: String,
    },

    /// A record exists but holds no usable version name.
    #[error("handoff record at {location} is empty")]
    Empty {
        /// Where the record was found.
        location: String,
    },

    /// Underlying storage failed.
    #[error("handoff storage I/O failed at {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// The I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// Durable, single-consumer record of "this version was verified releasable".
///
/// One writer (`verify`) and one reader-deleter (`release`) per project key,
/// expected to run in strict temporal order.
pub trait HandoffStore: Send + Sync {
    /// Writes or overwrites the record for `project`.
    ///
    /// A reader never observes a partially written value.
    fn put(&self, project: &ProjectKey, version: &VersionName) -> Result<(), HandoffError>;

    /// Reads the record for `project` and deletes it as one logical step.
    ///
    /// # Errors
    ///
    /// Returns [`HandoffError::Missing`] when no record exists.
    fn take_and_clear(&self, project: &ProjectKey) -> Result<VersionName, HandoffError>;
}
