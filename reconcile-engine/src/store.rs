//! Persistent store collaborator.
//!
//! The engine persists its collections through a narrow key-value
//! interface so any backend (SQLite, files, browser storage behind FFI)
//! can supply durability. Load failures mean "start empty"; save failures
//! are surfaced as events and the in-memory state stays authoritative for
//! the current process.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend failure (I/O, database, quota).
    #[error("backend error: {0}")]
    Backend(String),

    /// Value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A generic key-value store for engine state.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Loads the value stored under `key`, or `None` if absent.
    async fn load(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn save(&self, key: &str, value: &Value) -> StoreResult<()>;
}

/// An in-memory store for tests and embedding without persistence.
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// In-memory `StateStore` with failure toggles for exercising
    /// load/save error paths.
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        entries: Mutex<HashMap<String, Value>>,
        fail_loads: AtomicBool,
        fail_saves: AtomicBool,
    }

    impl MemoryStore {
        /// Creates an empty store.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes subsequent loads fail.
        pub fn set_fail_loads(&self, fail: bool) {
            self.fail_loads.store(fail, Ordering::SeqCst);
        }

        /// Makes subsequent saves fail.
        pub fn set_fail_saves(&self, fail: bool) {
            self.fail_saves.store(fail, Ordering::SeqCst);
        }

        /// Returns the stored value under `key`, if any.
        pub fn get(&self, key: &str) -> Option<Value> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        /// Seeds a value directly, bypassing the trait.
        pub fn put(&self, key: impl Into<String>, value: Value) {
            self.entries.lock().unwrap().insert(key.into(), value);
        }
    }

    #[async_trait]
    impl StateStore for MemoryStore {
        async fn load(&self, key: &str) -> StoreResult<Option<Value>> {
            if self.fail_loads.load(Ordering::SeqCst) {
                return Err(StoreError::Backend("injected load failure".to_string()));
            }
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn save(&self, key: &str, value: &Value) -> StoreResult<()> {
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(StoreError::Backend("injected save failure".to_string()));
            }
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.clone());
            Ok(())
        }
    }
}
