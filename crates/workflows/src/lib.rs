//! relgate workflows.
//!
//! This crate provides the two pipeline steps of the release handshake:
//!
//! - [`VerifyWorkflow`]: gates a release on zero unresolved issues and records
//!   the verified version in the handoff store.
//! - [`ReleaseWorkflow`]: consumes that record, marks the version released and
//!   makes sure the next version exists.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Workflows sequence calls between the business
//! logic in the [`release`] crate and the tracker and handoff ports. They
//! contain no transport or storage details of their own.
//!
//! Every run is one sequential chain of awaited calls; any error ends the run.

mod release_step;
mod verify;

use release::{InvocationId, RunMode};

pub use release_step::{ReleaseOutcome, ReleaseWorkflow};
pub use verify::{VerifyOutcome, VerifyWorkflow};

/// Per-invocation settings shared by both workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation {
    /// Correlates every log line of this run.
    pub id: InvocationId,
    /// Live or dry run.
    pub mode: RunMode,
}

impl Invocation {
    /// Creates an invocation with a fresh random id.
    pub fn new(mode: RunMode) -> Self {
        Self {
            id: InvocationId::new_random(),
            mode,
        }
    }
}
