//! Thin persistence orchestration over the state store.
//!
//! Load failures fall back to empty collections; save failures are
//! surfaced as events and the in-memory state remains authoritative for
//! the current process.

use crate::events::{EngineEvent, EventBus};
use crate::store::StateStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::warn;

/// Storage key for the open conflict set.
pub const CONFLICTS_KEY: &str = "conflicts";
/// Storage key for the capped resolution history.
pub const HISTORY_KEY: &str = "resolution_history";
/// Storage key for user preferences.
pub const PREFERENCES_KEY: &str = "user_preferences";

pub(crate) struct PersistenceFacade {
    store: Arc<dyn StateStore>,
    events: EventBus,
}

impl PersistenceFacade {
    pub fn new(store: Arc<dyn StateStore>, events: EventBus) -> Self {
        Self { store, events }
    }

    /// Loads the collection under `key`, falling back to the default on
    /// absence, backend failure, or a value that no longer decodes.
    pub async fn load_or_default<T>(&self, key: &'static str) -> T
    where
        T: DeserializeOwned + Default,
    {
        let value = match self.store.load(key).await {
            Ok(Some(value)) => value,
            Ok(None) => return T::default(),
            Err(e) => {
                warn!("Failed to load '{}': {}", key, e);
                self.events.emit(EngineEvent::StateLoadFailed {
                    key,
                    message: e.to_string(),
                });
                return T::default();
            }
        };

        match serde_json::from_value(value) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Failed to decode persisted '{}': {}", key, e);
                self.events.emit(EngineEvent::StateLoadFailed {
                    key,
                    message: e.to_string(),
                });
                T::default()
            }
        }
    }

    /// Saves `value` under `key`. Failures are non-fatal.
    pub async fn save<T: Serialize>(&self, key: &'static str, value: &T) {
        let serialized = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to encode '{}': {}", key, e);
                self.events.emit(EngineEvent::StateSaveFailed {
                    key,
                    message: e.to_string(),
                });
                return;
            }
        };

        if let Err(e) = self.store.save(key, &serialized).await {
            warn!("Failed to save '{}': {}", key, e);
            self.events.emit(EngineEvent::StateSaveFailed {
                key,
                message: e.to_string(),
            });
        }
    }
}
