//! Conflict detection and resolution engine for offline-first sync.
//!
//! Reconciles divergent copies of a data record produced by disconnected
//! clients and a server of record: decides whether two versions actually
//! disagree, how severe the disagreement is, which merge strategy is most
//! likely to produce a correct result, and whether a resolution may be
//! applied automatically or must be escalated to a human.
//!
//! # Architecture
//!
//! - **Classifier**: detects conflicts and characterizes them (severity,
//!   affected fields, description)
//! - **Ranker**: attaches ordered resolution suggestions from the
//!   strategy catalog
//! - **Policy**: gates unattended resolution on suggestion confidence
//! - **Executor**: applies a chosen strategy (pure step)
//! - **Engine**: owns the open set, the capped audit history, and
//!   persistence through the collaborator traits
//!
//! # Pipeline
//!
//! A batch of pending local operations arrives → conflicts are detected
//! against fetched server state → ranked suggestions are attached → the
//! auto-resolve policy either resolves immediately or leaves the conflict
//! queued for a human → the resolved entity is persisted and returned as
//! authoritative.
//!
//! # Example
//!
//! ```
//! use reconcile_engine::{ConflictEngine, EngineConfig};
//! use reconcile_engine::fetch::mock::StaticFetcher;
//! use reconcile_engine::store::memory::MemoryStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! let fetcher = Arc::new(StaticFetcher::new());
//! let engine = ConflictEngine::new(store, fetcher, EngineConfig::default());
//!
//! assert!(engine.resolution_strategies().contains(&"local_wins".to_string()));
//! ```

mod classifier;
mod engine;
mod error;
mod events;
pub mod executor;
pub mod fetch;
mod persistence;
mod policy;
mod ranker;
pub mod store;

pub use classifier::ConflictClassifier;
pub use engine::{ConflictEngine, EngineConfig, NetworkConditions, Preferences};
pub use error::{EngineError, EngineResult};
pub use events::{EngineEvent, EventBus};
pub use executor::{ResolutionOutcome, apply_strategy};
pub use fetch::{FetchError, FetchResult, ServerDataFetcher};
pub use persistence::{CONFLICTS_KEY, HISTORY_KEY, PREFERENCES_KEY};
pub use policy::{AutoResolvePolicy, DEFAULT_CONFIDENCE_THRESHOLD};
pub use ranker::SuggestionRanker;
pub use store::{StateStore, StoreError, StoreResult};
