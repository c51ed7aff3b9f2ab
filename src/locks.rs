use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

/// Lock map handing out one mutex per key.
///
/// Work on different keys proceeds in parallel; work on the same key is
/// serialized. The map only grows with the set of distinct keys ever seen,
/// which for this agent is a handful of log paths and rule files.
#[derive(Debug)]
pub struct KeyedLocks<K> {
    locks: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `key`.
    pub fn with_lock<R>(&self, key: &K, f: impl FnOnce() -> R) -> R {
        let slot = self.slot(key);
        let _guard = relock(&slot);
        f()
    }

    fn slot(&self, key: &K) -> Arc<Mutex<()>> {
        let mut locks = relock(&self.locks);
        locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Number of distinct keys that have been locked.
    pub fn len(&self) -> usize {
        relock(&self.locks).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Poisoning only means another caller panicked mid-operation; the guarded
// value carries no invariant of its own.
fn relock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
