//! Release domain for relgate.
//!
//! This crate contains every domain concept used by the verify→release
//! handshake: newtype identifiers, value types, naming rules, the tracker
//! operations the workflows call, and the port traits infrastructure crates
//! implement. It never performs I/O itself.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** It defines *what* is needed;
//! the `jira` and `handoff` crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`ProjectKey`, `VersionName`, etc.) |
//! | [`types`] | Build metadata, tracker entities, outcomes, `RunMode` |
//! | [`naming`] | Version normalization and project-key derivation |
//! | [`tracker`] | Lookups and mutations over [`IssueTracker`] |
//! | [`ports`] | `IssueTracker`, `TrackerConnector`, `HandoffStore` |
//! | [`errors`] | [`ReleaseGateError`] |

pub mod errors;
pub mod identifiers;
pub mod naming;
pub mod ports;
pub mod tracker;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::ReleaseGateError;
pub use identifiers::{InvocationId, ProjectKey, VersionName, VersionRef};
pub use naming::{
    normalize_release_version, project_key_from_tracker_url, tracker_base_url, BuildContext,
};
pub use ports::{
    HandoffError, HandoffStore, IssueTracker, TrackerConnector, TrackerError, TrackerResult,
};
pub use types::{
    BuildMetadata, CreateOutcome, IssueCount, MarkOutcome, RunMode, Timestamp, TrackerCredentials,
    TrackerLocation, TrackerProject, TrackerVersion,
};
