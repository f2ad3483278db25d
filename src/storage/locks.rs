//! Per-unit lock registry
//!
//! Serializes "resolve revision → write/move" for one unit key while leaving
//! other units free to proceed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::storage::paths::UnitKey;

/// Registry of one mutex per unit key currently in use
pub struct UnitLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UnitLocks {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Run `f` while holding the lock for `unit`.
    ///
    /// The lock is released when `f` returns, whatever it returns.
    pub fn with_unit<T>(&self, unit: &UnitKey, f: impl FnOnce() -> T) -> T {
        let lock = self.acquire_handle(unit);
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        self.release_handle(unit, lock);
        result
    }

    fn acquire_handle(&self, unit: &UnitKey) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(unit.as_str().to_string()).or_default())
    }

    fn release_handle(&self, unit: &UnitKey, lock: Arc<Mutex<()>>) {
        drop(lock);
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // handles are cloned only under the registry lock and dropped before taking it,
        // so a count of one means the map holds the last handle
        let unused = locks
            .get(unit.as_str())
            .is_some_and(|entry| Arc::strong_count(entry) == 1);
        if unused {
            locks.remove(unit.as_str());
        }
    }

    /// Number of unit keys with a live lock
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for UnitLocks {
    fn default() -> Self {
        Self::new()
    }
}
