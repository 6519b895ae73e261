//! The `verify` step.

use release::{
    tracker, BuildContext, BuildMetadata, HandoffStore, ProjectKey, ReleaseGateError,
    TrackerConnector, VersionName,
};
use tracing::{info, info_span, warn, Instrument};

use crate::Invocation;

/// How a successful `verify` run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Dry run requested; nothing was contacted or written.
    DryRun,
    /// The build declares no supported tracker; nothing to verify.
    NoTracker,
    /// The version has no unresolved issues and was recorded for release.
    Releasable {
        /// Project the record was written for.
        project_key: ProjectKey,
        /// Recorded, normalized version name.
        version: VersionName,
        /// The tracker already had the version marked as released.
        already_released: bool,
    },
}

/// Checks that the declared version may be released and records it.
#[derive(Debug, Clone)]
pub struct VerifyWorkflow<C, H> {
    connector: C,
    handoff: H,
}

impl<C, H> VerifyWorkflow<C, H>
where
    C: TrackerConnector,
    H: HandoffStore,
{
    /// Creates the workflow over a tracker connector and a handoff store.
    pub fn new(connector: C, handoff: H) -> Self {
        Self { connector, handoff }
    }

    /// Runs the step for one build.
    ///
    /// The handoff record is written as soon as the version is found, before
    /// the unresolved-issue gate, so a blocked run still leaves the latest
    /// verified name behind.
    ///
    /// # Errors
    ///
    /// - [`ReleaseGateError::Configuration`] for an unusable tracker declaration
    ///   or connector configuration.
    /// - [`ReleaseGateError::ProjectNotFound`] / [`ReleaseGateError::VersionNotFound`]
    ///   when the tracker lacks the project or version.
    /// - [`ReleaseGateError::ReleaseBlocked`] when unresolved issues remain.
    /// - [`ReleaseGateError::Remote`] / [`ReleaseGateError::Storage`] on
    ///   tracker or storage failure.
    pub async fn run(
        &self,
        invocation: Invocation,
        metadata: &BuildMetadata,
    ) -> Result<VerifyOutcome, ReleaseGateError> {
        let span = info_span!("verify", invocation = %invocation.id);
        self.execute(invocation, metadata).instrument(span).await
    }

    async fn execute(
        &self,
        invocation: Invocation,
        metadata: &BuildMetadata,
    ) -> Result<VerifyOutcome, ReleaseGateError> {
        if invocation.mode.is_dry_run() {
            info!("dryRun specified. Not contacting the tracker");
            return Ok(VerifyOutcome::DryRun);
        }

        let context = BuildContext::resolve(metadata)?;
        let Some(location) = context.tracker.as_ref() else {
            return Ok(VerifyOutcome::NoTracker);
        };

        let client = self.connector.connect(location).await?;
        let project = tracker::find_project(&client, &location.project_key).await?;
        let version = tracker::find_version(&project, &context.declared_version)?;

        self.handoff.put(&project.key, &version.name)?;

        let count = tracker::count_unresolved(&client, &version).await?;

        if version.released {
            warn!(
                project = %project.name,
                version = %version.name,
                "{}/{} has already been marked as released",
                project.name,
                version.name
            );
        }

        if !count.is_zero() {
            return Err(ReleaseGateError::ReleaseBlocked {
                project_name: project.name,
                version: version.name,
                count,
            });
        }

        info!(
            project = %project.name,
            version = %version.name,
            "{}/{} has 0 unresolved issues. Releasing is possible",
            project.name,
            version.name
        );
        Ok(VerifyOutcome::Releasable {
            project_key: project.key,
            version: version.name,
            already_released: version.released,
        })
    }
}
