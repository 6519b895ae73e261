//! File-system handoff store.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use release::{HandoffError, HandoffStore, ProjectKey, VersionName};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// File-name suffix appended to the project key.
const RECORD_SUFFIX: &str = "_releasedVersion.txt";

/// Stores one record per project key as a plain text file.
///
/// The file content is exactly the version name. Writes go through a temp file
/// in the same directory and are renamed into place; reads claim the file by
/// renaming it to a unique name before reading, so two readers can never both
/// consume the same record.
#[derive(Debug, Clone)]
pub struct FileHandoffStore {
    dir: PathBuf,
}

impl FileHandoffStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for `project`.
    pub fn record_path(&self, project: &ProjectKey) -> PathBuf {
        self.dir.join(format!("{project}{RECORD_SUFFIX}"))
    }

    fn claim_path(&self, project: &ProjectKey) -> PathBuf {
        self.dir
            .join(format!("{project}{RECORD_SUFFIX}.{}.claimed", Uuid::new_v4()))
    }
}

/// Puts an unreadable claimed record back, unless a newer record has
/// been written in the meantime.
fn restore_claim(claimed: &Path, record: &Path) {
    let restored = if record.exists() {
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "a newer record is present",
        ))
    } else {
        fs::rename(claimed, record)
    };
    if let Err(e) = restored {
        warn!(
            path = %claimed.display(),
            error = %e,
            "Unreadable handoff record left at its claimed path"
        );
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> HandoffError + '_ {
    move |source| HandoffError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl HandoffStore for FileHandoffStore {
    fn put(&self, project: &ProjectKey, version: &VersionName) -> Result<(), HandoffError> {
        let target = self.record_path(project);
        fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;

        let mut temp = tempfile::NamedTempFile::new_in(&self.dir).map_err(io_error(&self.dir))?;
        temp.as_file_mut()
            .write_all(version.as_str().as_bytes())
            .map_err(io_error(temp.path()))?;
        temp.as_file().sync_all().map_err(io_error(temp.path()))?;
        temp.persist(&target).map_err(|e| HandoffError::Io {
            path: target.clone(),
            source: e.error,
        })?;

        info!(
            project = %project,
            version = %version,
            path = %target.display(),
            "Recorded verified release version"
        );
        Ok(())
    }

    fn take_and_clear(&self, project: &ProjectKey) -> Result<VersionName, HandoffError> {
        let record = self.record_path(project);
        let claimed = self.claim_path(project);

        match fs::rename(&record, &claimed) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(HandoffError::Missing {
                    project_key: project.clone(),
                    location: record.display().to_string(),
                });
            }
            Err(e) => return Err(io_error(&record)(e)),
        }

        let content = match fs::read_to_string(&claimed) {
            Ok(content) => content,
            Err(e) => {
                restore_claim(&claimed, &record);
                return Err(io_error(&claimed)(e));
            }
        };
        fs::remove_file(&claimed).map_err(io_error(&claimed))?;
        debug!(path = %record.display(), "Consumed handoff record");

        VersionName::new(content.trim()).ok_or_else(|| HandoffError::Empty {
            location: record.display().to_string(),
        })
    }
}
