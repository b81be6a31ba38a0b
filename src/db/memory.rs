use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use crate::error::{AppError, Result};

use super::store::KvStore;

#[derive(Default)]
struct State {
    values: HashMap<String, Value>,
    failing_writes: HashSet<String>,
    unavailable: bool,
    writes: Vec<String>,
}

/// In-memory key-value store for tests.
///
/// Failures can be injected per key (writes) or globally (unavailable), and
/// every successful write is recorded so tests can assert on write-backs.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means a test panicked mid-write; the map is still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Put a raw value in place without recording a write.
    pub fn seed(&self, key: &str, value: Value) {
        self.lock().values.insert(key.to_string(), value);
    }

    pub fn raw(&self, key: &str) -> Option<Value> {
        self.lock().values.get(key).cloned()
    }

    /// Keys written since creation, in order.
    pub fn writes(&self) -> Vec<String> {
        self.lock().writes.clone()
    }

    pub fn fail_writes_to(&self, key: &str, fail: bool) {
        let mut state = self.lock();
        if fail {
            state.failing_writes.insert(key.to_string());
        } else {
            state.failing_writes.remove(key);
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }
}

impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let state = self.lock();
        if state.unavailable {
            return Err(AppError::StoreUnavailable("memory store offline".to_string()));
        }
        Ok(state.values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut state = self.lock();
        if state.unavailable {
            return Err(AppError::StoreUnavailable("memory store offline".to_string()));
        }
        if state.failing_writes.contains(key) {
            return Err(AppError::store(key, "Simulated write error"));
        }
        state.values.insert(key.to_string(), value);
        state.writes.push(key.to_string());
        Ok(())
    }
}
