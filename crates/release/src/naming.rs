//! Version and project naming rules.
//!
//! Pure functions deriving the canonical release-version name and the tracker
//! project identity from build metadata. Nothing here touches the network.

use tracing::info;

use crate::{BuildMetadata, ProjectKey, ReleaseGateError, TrackerLocation, VersionName};

/// Pre-release marker stripped from declared versions.
pub const SNAPSHOT_MARKER: &str = "-SNAPSHOT";

/// The only issue-management system this tool integrates with.
pub const SUPPORTED_TRACKER_SYSTEM: &str = "JIRA";

/// Removes every occurrence of [`SNAPSHOT_MARKER`] from `declared_version`.
///
/// Replace-all, not suffix-only: `"1.0-SNAPSHOT-SNAPSHOT"` becomes `"1.0"`.
/// Idempotent.
pub fn normalize_release_version(declared_version: &str) -> String {
    declared_version.replace(SNAPSHOT_MARKER, "")
}

/// Normalizes `declared_version` into a [`VersionName`].
///
/// # Errors
///
/// Returns [`ReleaseGateError::Configuration`] when nothing is left after
/// normalization.
pub fn release_version_name(declared_version: &str) -> Result<VersionName, ReleaseGateError> {
    VersionName::new(normalize_release_version(declared_version.trim())).ok_or_else(|| {
        ReleaseGateError::configuration(format!(
            "declared version '{declared_version}' is empty after removing '{SNAPSHOT_MARKER}'"
        ))
    })
}

/// Trims whitespace and exactly one trailing slash.
fn canonical_tracker_url(url: &str) -> &str {
    let trimmed = url.trim();
    trimmed.strip_suffix('/').unwrap_or(trimmed)
}

/// Extracts the project key from a tracker URL of the form `.../browse/<KEY>`.
///
/// # Errors
///
/// Returns [`ReleaseGateError::Configuration`] when the URL is blank or ends in
/// an empty segment.
pub fn project_key_from_tracker_url(url: &str) -> Result<ProjectKey, ReleaseGateError> {
    let url = canonical_tracker_url(url);
    if url.is_empty() {
        return Err(ReleaseGateError::configuration(
            "A JIRA issue tracker has been specified, but its url is empty",
        ));
    }
    let segment = url.rsplit('/').next().unwrap_or(url);
    ProjectKey::new(segment).ok_or_else(|| {
        ReleaseGateError::configuration(format!(
            "tracker url '{url}' does not end in a project key"
        ))
    })
}

/// Removes the literal `/browse/<KEY>` from the tracker URL, leaving the
/// tracker service's root endpoint.
pub fn tracker_base_url(tracker_url: &str, project_key: &ProjectKey) -> String {
    tracker_url.replace(&format!("/browse/{project_key}"), "")
}

/// Immutable per-invocation facts the workflows run on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    /// Version declared by the build, as given.
    pub declared_version: String,
    /// Tracker location, or `None` when no supported tracker is configured.
    pub tracker: Option<TrackerLocation>,
}

impl BuildContext {
    /// Resolves raw build metadata.
    ///
    /// No tracker system, or one other than [`SUPPORTED_TRACKER_SYSTEM`]
    /// (compared case-sensitively, so `jira` is unsupported), yields
    /// `tracker: None` with a notice.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseGateError::Configuration`] when a JIRA tracker is
    /// declared without a usable URL.
    pub fn resolve(metadata: &BuildMetadata) -> Result<Self, ReleaseGateError> {
        let tracker = match metadata.tracker_system.as_deref().map(str::trim) {
            None | Some("") => {
                info!("No issue management configured. Ignoring...");
                None
            }
            Some(system) if system != SUPPORTED_TRACKER_SYSTEM => {
                info!(
                    system,
                    "Issue management system is not supported, only '{SUPPORTED_TRACKER_SYSTEM}'. Ignoring..."
                );
                None
            }
            Some(_) => {
                let raw = metadata.tracker_url.as_deref().unwrap_or_default();
                let project_key = project_key_from_tracker_url(raw)?;
                let url = canonical_tracker_url(raw).to_owned();
                let base_url = tracker_base_url(&url, &project_key);
                Some(TrackerLocation {
                    url,
                    project_key,
                    base_url,
                })
            }
        };

        Ok(Self {
            declared_version: metadata.declared_version.clone(),
            tracker,
        })
    }

    /// Canonical release version name for the declared version.
    ///
    /// # Errors
    ///
    /// See [`release_version_name`].
    pub fn release_version(&self) -> Result<VersionName, ReleaseGateError> {
        release_version_name(&self.declared_version)
    }
}
