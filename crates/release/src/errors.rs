//! Top-level error type for the release domain.
//!
//! [`ReleaseGateError`] covers every condition that terminates a `verify` or
//! `release` invocation. Component-level errors (tracker adapter failures,
//! handoff storage failures) are defined next to their ports in
//! [`crate::ports`] and convert into this type.
//!
//! None of these conditions is retried. "Version already released" and
//! "version already exists" are deliberately absent: they are reported through
//! [`crate::MarkOutcome`] and [`crate::CreateOutcome`] instead.

use thiserror::Error;

use crate::ports::{HandoffError, TrackerError};
use crate::{IssueCount, ProjectKey, VersionName};

/// Errors that terminate a workflow invocation.
#[derive(Debug, Error)]
pub enum ReleaseGateError {
    /// Tracker configuration is malformed or missing where one was expected.
    ///
    /// Produced by: build-context resolution (blank tracker URL), connector
    /// construction (missing credentials, unparsable base URL).
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// The tracker has no project with the derived key.
    #[error("Tracker project '{project_key}' does NOT exist in the tracker.")]
    ProjectNotFound {
        /// Key that was looked up.
        project_key: ProjectKey,
    },

    /// The project has no version with the looked-up name.
    #[error(
        "Version '{version}' for tracker project '{project_name}' does NOT exist. \
         Please add it in the tracker."
    )]
    VersionNotFound {
        /// Display name of the project.
        project_name: String,
        /// Normalized version name that was looked up.
        version: VersionName,
    },

    /// Unresolved issues remain on the version being verified.
    #[error(
        "Tracker project '{project_name}/{version}' has {count} unresolved issues. \
         Releasing is not allowed unless it is 0. Please resolve them in the tracker."
    )]
    ReleaseBlocked {
        /// Display name of the project.
        project_name: String,
        /// Version that was verified.
        version: VersionName,
        /// Exact number of unresolved issues reported by the tracker.
        count: IssueCount,
    },

    /// `release` ran without a preceding successful `verify` for this project.
    #[error(
        "No verified release version recorded for project '{project_key}' ({location}). \
         The verify step must run successfully before release."
    )]
    MissingHandoff {
        /// Project whose record was missing.
        project_key: ProjectKey,
        /// Where the record was expected (file path or store description).
        location: String,
    },

    /// Transport or authentication failure talking to the tracker.
    #[error("Tracker request failed: {0}")]
    Remote(#[source] TrackerError),

    /// The handoff record could not be written or read.
    #[error("Handoff storage failed: {0}")]
    Storage(#[source] HandoffError),
}

impl ReleaseGateError {
    /// Shorthand for [`ReleaseGateError::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl From<TrackerError> for ReleaseGateError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::Configuration(message) => Self::Configuration { message },
            other => Self::Remote(other),
        }
    }
}

impl From<HandoffError> for ReleaseGateError {
    fn from(err: HandoffError) -> Self {
        match err {
            HandoffError::Missing {
                project_key,
                location,
            } => Self::MissingHandoff {
                project_key,
                location,
            },
            other => Self::Storage(other),
        }
    }
}
