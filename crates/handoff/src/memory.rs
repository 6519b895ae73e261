//! In-memory handoff store for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use release::{HandoffError, HandoffStore, ProjectKey, VersionName};

/// Thread-safe, process-local handoff store.
///
/// Clones share the same records. Counts writes and reads so tests can assert
/// that a dry run never touched the store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHandoffStore {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    records: HashMap<ProjectKey, VersionName>,
    operations: usize,
}

impl InMemoryHandoffStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the unconsumed record for `project` without consuming it.
    pub fn peek(&self, project: &ProjectKey) -> Option<VersionName> {
        self.lock().records.get(project).cloned()
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    /// Returns `true` if no record is held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `put` and `take_and_clear` calls made so far.
    pub fn operations(&self) -> usize {
        self.lock().operations
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means another test thread panicked mid-call.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl HandoffStore for InMemoryHandoffStore {
    fn put(&self, project: &ProjectKey, version: &VersionName) -> Result<(), HandoffError> {
        let mut state = self.lock();
        state.operations += 1;
        state.records.insert(project.clone(), version.clone());
        Ok(())
    }

    fn take_and_clear(&self, project: &ProjectKey) -> Result<VersionName, HandoffError> {
        let mut state = self.lock();
        state.operations += 1;
        state.records.remove(project).ok_or_else(|| HandoffError::Missing {
            project_key: project.clone(),
            location: format!("memory:{project}"),
        })
    }
}
