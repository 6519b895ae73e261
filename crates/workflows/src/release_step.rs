//! The `release` step.

use release::{
    tracker, BuildContext, BuildMetadata, CreateOutcome, HandoffStore, MarkOutcome, ProjectKey,
    ReleaseGateError, Timestamp, TrackerConnector, VersionName,
};
use tracing::{info, info_span, Instrument};

use crate::Invocation;

/// How a successful `release` run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Dry run requested; nothing was contacted or consumed.
    DryRun,
    /// The build declares no supported tracker; nothing to release.
    NoTracker,
    /// The recorded version was marked released and the next version ensured.
    Released {
        /// Project released.
        project_key: ProjectKey,
        /// Version taken from the handoff record.
        released: VersionName,
        /// Whether the version was already released beforehand.
        mark: MarkOutcome,
        /// The next version, created or pre-existing.
        next: CreateOutcome,
    },
}

/// Marks the verified version released and opens the next one.
#[derive(Debug, Clone)]
pub struct ReleaseWorkflow<C, H> {
    connector: C,
    handoff: H,
}

impl<C, H> ReleaseWorkflow<C, H>
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
    /// `metadata.declared_version` is the *live* declared version, which a
    /// release pipeline has normally advanced past the released one; its
    /// normalized name becomes the next tracker version.
    ///
    /// Marking and creating are independent: if creating the next version
    /// fails, the release mark stays in place and the error is returned.
    ///
    /// # Errors
    ///
    /// - [`ReleaseGateError::MissingHandoff`] when no verify run recorded a
    ///   version for the project. No tracker mutation happens in that case.
    /// - [`ReleaseGateError::VersionNotFound`] when the recorded version no
    ///   longer exists in the tracker.
    /// - Configuration, lookup, remote and storage errors as for verify.
    pub async fn run(
        &self,
        invocation: Invocation,
        metadata: &BuildMetadata,
    ) -> Result<ReleaseOutcome, ReleaseGateError> {
        let span = info_span!("release", invocation = %invocation.id);
        self.execute(invocation, metadata).instrument(span).await
    }

    async fn execute(
        &self,
        invocation: Invocation,
        metadata: &BuildMetadata,
    ) -> Result<ReleaseOutcome, ReleaseGateError> {
        if invocation.mode.is_dry_run() {
            info!("dryRun specified. Not updating the tracker");
            return Ok(ReleaseOutcome::DryRun);
        }

        let context = BuildContext::resolve(metadata)?;
        let Some(location) = context.tracker.as_ref() else {
            return Ok(ReleaseOutcome::NoTracker);
        };
        let next_name = context.release_version()?;

        let client = self.connector.connect(location).await?;
        let project = tracker::find_project(&client, &location.project_key).await?;

        let released_name = self.handoff.take_and_clear(&project.key)?;
        let version = tracker::find_version(&project, released_name.as_str())?;

        let mark = tracker::mark_released(&client, &project, &version, Timestamp::now()).await?;
        if mark == MarkOutcome::AlreadyReleased {
            info!(
                project = %project.name,
                version = %version.name,
                "Version was already released; release date refreshed"
            );
        }

        let next = tracker::create_version(&client, &project, &next_name).await?;

        Ok(ReleaseOutcome::Released {
            project_key: project.key,
            released: version.name,
            mark,
            next,
        })
    }
}
