//! Tracker operations used by the workflows.
//!
//! Thin domain layer over the [`IssueTracker`] port: turns "absent" answers
//! into [`ReleaseGateError`]s and the two re-runnable mutations into tagged
//! outcomes.

use tracing::{info, warn};

use crate::ports::IssueTracker;
use crate::{
    naming, CreateOutcome, IssueCount, MarkOutcome, ProjectKey, ReleaseGateError, Timestamp,
    TrackerProject, TrackerVersion, VersionName,
};

/// Looks up the project for `key`.
///
/// # Errors
///
/// [`ReleaseGateError::ProjectNotFound`] when the tracker has no such project;
/// [`ReleaseGateError::Remote`] on transport failure.
pub async fn find_project<T>(client: &T, key: &ProjectKey) -> Result<TrackerProject, ReleaseGateError>
where
    T: IssueTracker + ?Sized,
{
    client
        .project(key)
        .await?
        .ok_or_else(|| ReleaseGateError::ProjectNotFound {
            project_key: key.clone(),
        })
}

/// Finds the version named `name` (normalized first) in `project`.
///
/// Duplicate names are a tracker-side anomaly. When they occur the last match
/// in tracker order wins and a warning is logged.
///
/// # Errors
///
/// [`ReleaseGateError::VersionNotFound`] when no version matches.
pub fn find_version(
    project: &TrackerProject,
    name: &str,
) -> Result<TrackerVersion, ReleaseGateError> {
    let wanted = naming::release_version_name(name)?;
    let matches: Vec<&TrackerVersion> = project
        .versions
        .iter()
        .filter(|v| v.name == wanted)
        .collect();

    if matches.len() > 1 {
        warn!(
            project = %project.key,
            version = %wanted,
            count = matches.len(),
            "Tracker returned duplicate version names; using the last one"
        );
    }

    matches
        .last()
        .map(|v| (*v).clone())
        .ok_or_else(|| ReleaseGateError::VersionNotFound {
            project_name: project.name.clone(),
            version: wanted,
        })
}

/// Counts unresolved issues on `version`.
///
/// # Errors
///
/// [`ReleaseGateError::Remote`] on transport failure.
pub async fn count_unresolved<T>(
    client: &T,
    version: &TrackerVersion,
) -> Result<IssueCount, ReleaseGateError>
where
    T: IssueTracker + ?Sized,
{
    Ok(client.unresolved_issue_count(&version.self_ref).await?)
}

/// Marks `version` released at `released_at`.
///
/// The update is always sent, so an already-released version gets its release
/// date refreshed; that case is reported as [`MarkOutcome::AlreadyReleased`].
///
/// # Errors
///
/// [`ReleaseGateError::Remote`] on transport failure.
pub async fn mark_released<T>(
    client: &T,
    project: &TrackerProject,
    version: &TrackerVersion,
    released_at: Timestamp,
) -> Result<MarkOutcome, ReleaseGateError>
where
    T: IssueTracker + ?Sized,
{
    let outcome = if version.released {
        MarkOutcome::AlreadyReleased
    } else {
        MarkOutcome::Marked
    };

    info!(
        project = %project.name,
        version = %version.name,
        already_released = version.released,
        release_date = %released_at.date(),
        "Setting {}/{} as released",
        project.name,
        version.name
    );
    client.release_version(&version.self_ref, released_at).await?;

    Ok(outcome)
}

/// Ensures a version named `name` exists in `project`.
///
/// An exact-name match short-circuits without contacting the tracker.
///
/// # Errors
///
/// [`ReleaseGateError::Remote`] on transport failure.
pub async fn create_version<T>(
    client: &T,
    project: &TrackerProject,
    name: &VersionName,
) -> Result<CreateOutcome, ReleaseGateError>
where
    T: IssueTracker + ?Sized,
{
    if let Some(existing) = project.versions.iter().find(|v| &v.name == name) {
        info!(
            project = %project.key,
            version = %name,
            "Version already exists. Not creating version in the tracker"
        );
        return Ok(CreateOutcome::AlreadyExisted(existing.clone()));
    }

    let created = client.create_version(&project.key, name).await?;
    info!(project = %project.key, version = %created.name, "Version created in the tracker");
    Ok(CreateOutcome::Created(created))
}
