//! relgate Jira infrastructure adapter.
//!
//! Implements the [`release::TrackerConnector`] and [`release::IssueTracker`]
//! traits against the Jira REST API v2 using `reqwest` with basic
//! authentication.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. URL layout,
//! authentication, status mapping and payload decoding live here; the
//! [`release`] crate never sees them.
//!
//! ## Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | connect | `GET {base}/rest/api/2/myself` |
//! | project lookup | `GET {base}/rest/api/2/project/{key}` (404 → absent) |
//! | unresolved count | `GET {version.self}/unresolvedIssueCount` |
//! | mark released | `PUT {version.self}` |
//! | create version | `POST {base}/rest/api/2/version` |
//!
//! No retries are attempted; any failure is returned to the caller.

mod client;
mod wire;

pub use client::{JiraClient, JiraConnector, DEFAULT_TIMEOUT};
