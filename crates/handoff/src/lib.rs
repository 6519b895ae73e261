//! relgate handoff storage.
//!
//! Implements the [`release::HandoffStore`] port:
//!
//! - [`FileHandoffStore`]: one file per project key
//!   (`<projectKey>_releasedVersion.txt`) in a host-global directory, the
//!   process temp dir by default. Survives process exit, which is what lets
//!   `verify` and `release` run in separate pipeline stages.
//! - [`InMemoryHandoffStore`]: same contract, process-local. Used by tests.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** The [`release`] crate sees only the trait.

mod file;
mod memory;

pub use file::FileHandoffStore;
pub use memory::InMemoryHandoffStore;
