use super::record::{StateKey, StateRecord};
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persistence for harvest cursors.
///
/// `load` returns `Ok(None)` both when no record exists and when the stored
/// record is unreadable garbage; callers fall back to a fresh cursor either way.
/// Only genuine I/O faults are errors.
pub trait StateStore: Send + Sync {
    fn load(&self, key: &StateKey) -> Result<Option<StateRecord>, StateError>;

    /// Replace the record for `key`. Saving the same record twice is a no-op
    /// from the reader's point of view.
    fn save(&self, key: &StateKey, record: &StateRecord) -> Result<(), StateError>;
}

/// Process-local store, used when cursors need not outlive the process.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    records: Mutex<HashMap<StateKey, StateRecord>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self, key: &StateKey) -> Result<Option<StateRecord>, StateError> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Ok(records.get(key).cloned())
    }

    fn save(&self, key: &StateKey, record: &StateRecord) -> Result<(), StateError> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.insert(key.clone(), record.clone());
        Ok(())
    }
}
