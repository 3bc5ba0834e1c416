//! Server baseline fetch collaborator.
//!
//! Detection needs the server's current copy of each entity. The engine
//! reaches it through this trait; the integrating system supplies the
//! actual transport.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors raised by a fetch backend.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network failure.
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected response shape.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Fetches the server's current copy of an entity.
#[async_trait]
pub trait ServerDataFetcher: Send + Sync {
    /// Returns the server record, or `None` when the entity has never
    /// been synced — without a baseline no conflict is possible.
    async fn fetch(&self, entity_type: &str, entity_id: &str) -> FetchResult<Option<Value>>;
}

/// Mock fetchers for tests.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Serves records from an in-memory map keyed by
    /// `(entity_type, entity_id)`.
    #[derive(Debug, Default)]
    pub struct StaticFetcher {
        records: Mutex<HashMap<(String, String), Value>>,
        failing_entities: Mutex<std::collections::HashSet<String>>,
        fail: AtomicBool,
    }

    impl StaticFetcher {
        /// Creates an empty fetcher (every entity reads as never synced).
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Seeds the server copy of an entity.
        pub fn insert(
            &self,
            entity_type: impl Into<String>,
            entity_id: impl Into<String>,
            record: Value,
        ) {
            self.records
                .lock()
                .unwrap()
                .insert((entity_type.into(), entity_id.into()), record);
        }

        /// Removes the server copy of an entity.
        pub fn remove(&self, entity_type: &str, entity_id: &str) {
            self.records
                .lock()
                .unwrap()
                .remove(&(entity_type.to_string(), entity_id.to_string()));
        }

        /// Makes subsequent fetches fail.
        pub fn set_fail(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }

        /// Makes fetches for one entity fail, leaving the rest working.
        pub fn fail_entity(&self, entity_id: impl Into<String>) {
            self.failing_entities.lock().unwrap().insert(entity_id.into());
        }
    }

    #[async_trait]
    impl ServerDataFetcher for StaticFetcher {
        async fn fetch(&self, entity_type: &str, entity_id: &str) -> FetchResult<Option<Value>> {
            if self.fail.load(Ordering::SeqCst)
                || self.failing_entities.lock().unwrap().contains(entity_id)
            {
                return Err(FetchError::Network("injected fetch failure".to_string()));
            }
            Ok(self
                .records
                .lock()
                .unwrap()
                .get(&(entity_type.to_string(), entity_id.to_string()))
                .cloned())
        }
    }
}
