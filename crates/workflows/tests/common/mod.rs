//! Shared fakes for workflow tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use release::{
    BuildMetadata, IssueCount, IssueTracker, ProjectKey, Timestamp, TrackerConnector,
    TrackerError, TrackerLocation, TrackerProject, TrackerResult, TrackerVersion, VersionName,
    VersionRef,
};

pub const TRACKER_URL: &str = "https://issues.example.com/browse/ABC/";

/// Every call the fake tracker received, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect { base_url: String },
    Project(String),
    Count(String),
    Release { version: String, date: NaiveDate },
    Create { project: String, name: String },
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Release { .. } | Self::Create { .. })
    }
}

#[derive(Debug, Default)]
struct State {
    projects: HashMap<String, TrackerProject>,
    unresolved: HashMap<String, u64>,
    calls: Vec<Call>,
    fail_create: bool,
}

/// In-memory tracker that doubles as its own connector.
#[derive(Debug, Clone, Default)]
pub struct FakeTracker {
    state: Arc<Mutex<State>>,
}

fn self_ref(project: &str, version: &str) -> String {
    format!("fake://{project}/version/{version}")
}

impl FakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a project `key` named `name` with `(version, released, unresolved)` entries.
    pub fn with_project(self, key: &str, name: &str, versions: &[(&str, bool, u64)]) -> Self {
        {
            let mut state = self.lock();
            let mut list = Vec::new();
            for (version, released, unresolved) in versions {
                let reference = self_ref(key, version);
                state.unresolved.insert(reference.clone(), *unresolved);
                list.push(TrackerVersion {
                    name: VersionName::new(*version).expect("version name"),
                    released: *released,
                    release_date: None,
                    self_ref: VersionRef::new(reference).expect("self ref"),
                });
            }
            state.projects.insert(
                key.to_owned(),
                TrackerProject {
                    key: ProjectKey::new(key).expect("project key"),
                    name: name.to_owned(),
                    versions: list,
                },
            );
        }
        self
    }

    pub fn failing_creates(self) -> Self {
        self.lock().fail_create = true;
        self
    }

    pub fn set_unresolved(&self, project: &str, version: &str, count: u64) {
        self.lock().unresolved.insert(self_ref(project, version), count);
    }

    pub fn remove_version(&self, project: &str, version: &str) {
        if let Some(p) = self.lock().projects.get_mut(project) {
            p.versions.retain(|v| v.name.as_str() != version);
        }
    }

    pub fn version(&self, project: &str, version: &str) -> Option<TrackerVersion> {
        self.lock()
            .projects
            .get(project)
            .and_then(|p| p.versions.iter().find(|v| v.name.as_str() == version).cloned())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("fake tracker lock")
    }
}

#[async_trait]
impl TrackerConnector for FakeTracker {
    type Client = FakeTracker;

    async fn connect(&self, location: &TrackerLocation) -> TrackerResult<FakeTracker> {
        self.lock().calls.push(Call::Connect {
            base_url: location.base_url.clone(),
        });
        Ok(self.clone())
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn project(&self, key: &ProjectKey) -> TrackerResult<Option<TrackerProject>> {
        let mut state = self.lock();
        state.calls.push(Call::Project(key.to_string()));
        Ok(state.projects.get(key.as_str()).cloned())
    }

    async fn unresolved_issue_count(&self, version: &VersionRef) -> TrackerResult<IssueCount> {
        let mut state = self.lock();
        state.calls.push(Call::Count(version.to_string()));
        state
            .unresolved
            .get(version.as_str())
            .map(|c| IssueCount::new(*c))
            .ok_or_else(|| TrackerError::Api {
                status: 404,
                message: format!("no version at {version}"),
            })
    }

    async fn release_version(
        &self,
        version: &VersionRef,
        released_at: Timestamp,
    ) -> TrackerResult<()> {
        let mut state = self.lock();
        state.calls.push(Call::Release {
            version: version.to_string(),
            date: released_at.date(),
        });
        for project in state.projects.values_mut() {
            for v in project.versions.iter_mut().filter(|v| &v.self_ref == version) {
                v.released = true;
                v.release_date = Some(released_at.date());
            }
        }
        Ok(())
    }

    async fn create_version(
        &self,
        project: &ProjectKey,
        name: &VersionName,
    ) -> TrackerResult<TrackerVersion> {
        let mut state = self.lock();
        state.calls.push(Call::Create {
            project: project.to_string(),
            name: name.to_string(),
        });
        if state.fail_create {
            return Err(TrackerError::Api {
                status: 500,
                message: "create rejected".to_owned(),
            });
        }
        let reference = self_ref(project.as_str(), name.as_str());
        let created = TrackerVersion {
            name: name.clone(),
            released: false,
            release_date: None,
            self_ref: VersionRef::new(reference.clone()).expect("self ref"),
        };
        state.unresolved.insert(reference, 0);
        if let Some(p) = state.projects.get_mut(project.as_str()) {
            p.versions.push(created.clone());
        }
        Ok(created)
    }
}

pub fn jira_build(declared_version: &str) -> BuildMetadata {
    BuildMetadata {
        declared_version: declared_version.to_owned(),
        tracker_system: Some("JIRA".to_owned()),
        tracker_url: Some(TRACKER_URL.to_owned()),
    }
}

pub fn key(k: &str) -> ProjectKey {
    ProjectKey::new(k).expect("project key")
}

pub fn name(v: &str) -> VersionName {
    VersionName::new(v).expect("version name")
}
