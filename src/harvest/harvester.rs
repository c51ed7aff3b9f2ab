use super::reader::{batch_checksum, read_lines_between};
use super::HarvestBatch;
use crate::cancel::CancelToken;
use crate::config::HarvestConfig;
use crate::locks::KeyedLocks;
use crate::state::{FileStateStore, StateError, StateKey, StateRecord, StateStore};
use chrono::{DateTime, Utc};
use std::fs::{File, Metadata};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("harvest cancelled before the cursor was saved")]
    Cancelled,
}

/// Incremental reader over a fixed list of audit-log files.
///
/// Each call returns only lines appended since the previous call, using a
/// persisted cursor per file. A file whose size drops below its cursor is
/// treated as rotated and read again from the start. A file seen for the
/// first time is not replayed: its cursor starts at the current end.
///
/// Harvests of the same file are serialized; different files are independent.
pub struct LogHarvester {
    store: Arc<dyn StateStore>,
    log_paths: Vec<PathBuf>,
    locks: KeyedLocks<StateKey>,
}

impl LogHarvester {
    pub fn new(store: Arc<dyn StateStore>, log_paths: Vec<PathBuf>) -> Self {
        Self {
            store,
            log_paths,
            locks: KeyedLocks::new(),
        }
    }

    /// Harvester over the configured paths with cursors under `state_dir`.
    pub fn from_config(config: &HarvestConfig) -> Self {
        let store = Arc::new(FileStateStore::new(&config.state_dir));
        Self::new(store, config.log_paths.clone())
    }

    pub fn log_paths(&self) -> &[PathBuf] {
        &self.log_paths
    }

    /// Harvest the configured log paths.
    pub fn collect(&self) -> HarvestBatch {
        self.collect_cancellable(&CancelToken::new())
    }

    /// Harvest the configured log paths unless `token` is cancelled first.
    ///
    /// A cursor is only saved after a successful [`CancelToken::commit`], so
    /// once the caller cancels, no file advances and the next call returns the
    /// same lines again.
    pub fn collect_cancellable(&self, token: &CancelToken) -> HarvestBatch {
        self.harvest_paths(&self.log_paths, token)
    }

    /// Harvest `paths` in order and concatenate their new lines.
    ///
    /// Never fails: missing files are skipped, and a file that cannot be read
    /// contributes nothing and keeps its previous cursor so the next call
    /// retries the same window.
    pub fn collect_from(&self, paths: &[PathBuf]) -> HarvestBatch {
        self.harvest_paths(paths, &CancelToken::new())
    }

    fn harvest_paths(&self, paths: &[PathBuf], token: &CancelToken) -> HarvestBatch {
        let mut batch = HarvestBatch::new();

        for path in paths {
            if token.is_cancelled() {
                tracing::debug!("Harvest cancelled, leaving remaining cursors untouched");
                break;
            }

            match self.harvest_file(path, token) {
                Ok(Some(lines)) => batch.extend(lines),
                Ok(None) => {}
                Err(HarvestError::Cancelled) => {
                    tracing::debug!(
                        path = %path.display(),
                        "Harvest cancelled, cursor not advanced"
                    );
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to harvest log file, keeping previous cursor"
                    );
                }
            }
        }

        batch
    }

    /// Returns `Ok(None)` when the path is not a regular file that exists.
    fn harvest_file(
        &self,
        path: &Path,
        token: &CancelToken,
    ) -> Result<Option<Vec<String>>, HarvestError> {
        match std::fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => {
                tracing::debug!(path = %path.display(), "Skipping non-regular log path");
                return Ok(None);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::trace!(path = %path.display(), "Log path absent");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        let key = StateKey::for_path(path);
        self.locks
            .with_lock(&key, || self.harvest_locked(path, &key, token))
            .map(Some)
    }

    fn harvest_locked(
        &self,
        path: &Path,
        key: &StateKey,
        token: &CancelToken,
    ) -> Result<Vec<String>, HarvestError> {
        let file = File::open(path)?;
        let metadata = file.metadata()?;
        let current_size = metadata.len();

        let previous = match self.store.load(key)? {
            Some(record) => record,
            None => {
                tracing::info!(
                    path = %path.display(),
                    position = current_size,
                    "No cursor for log file, starting at end"
                );
                StateRecord::starting_at(current_size)
            }
        };

        let start = if current_size < previous.position {
            tracing::info!(
                path = %path.display(),
                previous_position = previous.position,
                current_size,
                "Log file shrank, treating as rotated"
            );
            0
        } else {
            previous.position
        };

        let lines = read_lines_between(&file, start, current_size)?;

        let record = StateRecord {
            position: current_size,
            checksum: batch_checksum(&lines),
            mod_time: mod_time_secs(&metadata),
        };
        if !token.commit() {
            return Err(HarvestError::Cancelled);
        }
        self.store.save(key, &record)?;

        tracing::debug!(
            path = %path.display(),
            start,
            position = current_size,
            lines = lines.len(),
            "Harvested log file"
        );

        Ok(lines)
    }
}

fn mod_time_secs(metadata: &Metadata) -> i64 {
    metadata
        .modified()
        .map(|t| DateTime::<Utc>::from(t).timestamp())
        .unwrap_or(0)
}
