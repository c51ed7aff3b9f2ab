use super::record::{StateKey, StateRecord};
use super::store::{StateError, StateStore};
use crate::fsutil::write_atomic;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Cursor records stored as `<dir>/<key>.json`, one file per watched log.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_path(&self, key: &StateKey) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StateStore for FileStateStore {
    fn load(&self, key: &StateKey) -> Result<Option<StateRecord>, StateError> {
        let path = self.record_path(key);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<StateRecord>(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Ignoring malformed state record"
                );
                Ok(None)
            }
        }
    }

    fn save(&self, key: &StateKey, record: &StateRecord) -> Result<(), StateError> {
        let bytes = serde_json::to_vec(record)?;
        write_atomic(&self.record_path(key), &bytes)?;
        Ok(())
    }
}
