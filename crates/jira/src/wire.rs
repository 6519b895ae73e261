//! Jira REST v2 payloads and their mapping onto domain types.
//!
//! Only the fields relgate consumes are modelled; everything else in the Jira
//! responses is ignored by serde.

use chrono::NaiveDate;
use release::{
    IssueCount, ProjectKey, TrackerError, TrackerProject, TrackerResult, TrackerVersion,
    VersionName, VersionRef,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// `GET /rest/api/2/project/{key}`
#[derive(Debug, Deserialize)]
pub(crate) struct ProjectPayload {
    key: String,
    name: String,
    #[serde(default)]
    versions: Vec<VersionPayload>,
}

/// One entry of `project.versions`, also the body returned by
/// `POST /rest/api/2/version`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VersionPayload {
    #[serde(rename = "self")]
    self_url: String,
    name: String,
    #[serde(default)]
    released: bool,
    #[serde(default)]
    release_date: Option<String>,
}

/// `GET {version.self}/unresolvedIssueCount`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UnresolvedCountPayload {
    issues_unresolved_count: u64,
}

/// Body of `PUT {version.self}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReleaseUpdate {
    pub(crate) released: bool,
    pub(crate) release_date: String,
}

/// Body of `POST /rest/api/2/version`.
#[derive(Debug, Serialize)]
pub(crate) struct NewVersion<'a> {
    pub(crate) name: &'a str,
    pub(crate) project: &'a str,
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> TrackerResult<T> {
    serde_json::from_str(body).map_err(|e| TrackerError::Parse(e.to_string()))
}

impl VersionPayload {
    pub(crate) fn into_domain(self) -> TrackerResult<TrackerVersion> {
        let name = VersionName::new(self.name)
            .ok_or_else(|| TrackerError::Parse("version without a name".to_owned()))?;
        let self_ref = VersionRef::new(self.self_url)
            .ok_or_else(|| TrackerError::Parse(format!("version '{name}' without a self link")))?;
        Ok(TrackerVersion {
            name,
            released: self.released,
            release_date: self
                .release_date
                .and_then(|d| d.parse::<NaiveDate>().ok()),
            self_ref,
        })
    }
}

impl ProjectPayload {
    pub(crate) fn into_domain(self) -> TrackerResult<TrackerProject> {
        let key = ProjectKey::new(self.key)
            .ok_or_else(|| TrackerError::Parse("project without a key".to_owned()))?;
        let versions = self
            .versions
            .into_iter()
            .map(VersionPayload::into_domain)
            .collect::<TrackerResult<Vec<_>>>()?;
        Ok(TrackerProject {
            key,
            name: self.name,
            versions,
        })
    }
}

impl UnresolvedCountPayload {
    pub(crate) fn into_domain(self) -> IssueCount {
        IssueCount::new(self.issues_unresolved_count)
    }
}
