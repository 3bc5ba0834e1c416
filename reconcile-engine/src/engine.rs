//! The conflict engine.
//!
//! Owns the open-conflict set, the resolution history, and user
//! preferences; orchestrates classifier, ranker, policy, and executor.
//! All mutable state lives behind one async lock — public operations are
//! async but non-preemptive with respect to engine state, with store and
//! fetcher calls as the only suspension points. Callers must not overlap
//! resolve calls for the same conflict id.

use crate::classifier::ConflictClassifier;
use crate::error::{EngineError, EngineResult};
use crate::events::{EngineEvent, EventBus};
use crate::executor;
use crate::fetch::ServerDataFetcher;
use crate::persistence::{CONFLICTS_KEY, HISTORY_KEY, PREFERENCES_KEY, PersistenceFacade};
use crate::policy::{AutoResolvePolicy, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::ranker::SuggestionRanker;
use crate::store::StateStore;
use reconcile_merge::StrategyCatalog;
use reconcile_types::{Conflict, ConflictId, Operation, Resolution, ResolvedBy, record};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};

/// Strategy names available without catalog registration.
const BASELINE_STRATEGIES: &[&str] =
    &[executor::LOCAL_WINS, executor::SERVER_WINS, executor::MANUAL];

/// Connectivity as reported by the embedding client.
///
/// Injected rather than probed — the engine never reads platform globals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConditions {
    /// Whether the client currently believes it is online.
    pub online: bool,
}

impl Default for NetworkConditions {
    fn default() -> Self {
        Self { online: true }
    }
}

/// Configuration for the conflict engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum top-suggestion confidence for unattended resolution.
    pub confidence_threshold: f64,
    /// Whether conflicts may be resolved without a human.
    pub auto_resolve: bool,
    /// Maximum retained resolution history entries. Eviction is FIFO —
    /// history is for audit, not access pattern.
    pub max_history: usize,
    /// Client-reported connectivity, used for suggestion risk.
    pub network: NetworkConditions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            auto_resolve: true,
            max_history: 50,
            network: NetworkConditions::default(),
        }
    }
}

/// Persisted user preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Strategy used when a resolve call supplies none.
    pub default_strategy: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            default_strategy: "field_level_merge".to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct EngineState {
    open: Vec<Conflict>,
    history: Vec<Resolution>,
    preferences: Preferences,
}

/// The conflict detection and resolution engine.
pub struct ConflictEngine {
    config: EngineConfig,
    catalog: StrategyCatalog,
    classifier: ConflictClassifier,
    ranker: SuggestionRanker,
    policy: AutoResolvePolicy,
    fetcher: Arc<dyn ServerDataFetcher>,
    persistence: PersistenceFacade,
    state: RwLock<EngineState>,
    events: EventBus,
}

impl ConflictEngine {
    /// Creates an engine with the built-in strategy catalog.
    pub fn new(
        store: Arc<dyn StateStore>,
        fetcher: Arc<dyn ServerDataFetcher>,
        config: EngineConfig,
    ) -> Self {
        Self::with_catalog(store, fetcher, config, StrategyCatalog::builtin())
    }

    /// Creates an engine with a custom strategy catalog.
    pub fn with_catalog(
        store: Arc<dyn StateStore>,
        fetcher: Arc<dyn ServerDataFetcher>,
        config: EngineConfig,
        catalog: StrategyCatalog,
    ) -> Self {
        let events = EventBus::new();
        let policy = AutoResolvePolicy::new(config.confidence_threshold, config.auto_resolve);
        Self {
            persistence: PersistenceFacade::new(store, events.clone()),
            catalog,
            classifier: ConflictClassifier::new(),
            ranker: SuggestionRanker::new(),
            policy,
            fetcher,
            config,
            state: RwLock::new(EngineState::default()),
            events,
        }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the strategy catalog.
    pub fn catalog(&self) -> &StrategyCatalog {
        &self.catalog
    }

    /// Subscribes to engine events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Hydrates open conflicts, history, and preferences from the store.
    ///
    /// Collections that fail to load start empty (surfaced as
    /// `StateLoadFailed` events).
    pub async fn restore(&self) {
        let open: Vec<Conflict> = self.persistence.load_or_default(CONFLICTS_KEY).await;
        let history: Vec<Resolution> = self.persistence.load_or_default(HISTORY_KEY).await;
        let preferences: Preferences = self.persistence.load_or_default(PREFERENCES_KEY).await;

        info!(
            "Restored {} open conflicts, {} history entries",
            open.len(),
            history.len()
        );

        let mut state = self.state.write().await;
        state.open = open;
        state.history = history;
        state.preferences = preferences;
    }

    // ── Detection ────────────────────────────────────────────────

    /// Detects conflicts for a batch of pending local operations.
    ///
    /// Each operation is checked against its fetched server baseline.
    /// Per-operation failures emit `DetectionError` and skip the item —
    /// one bad record never aborts the batch. Detected conflicts get
    /// ranked suggestions, join the open set, and are persisted.
    pub async fn detect_conflicts(&self, operations: &[Operation]) -> Vec<Conflict> {
        let mut detected = Vec::new();

        for operation in operations {
            let server_data = match self
                .fetcher
                .fetch(&operation.entity_type, &operation.entity_id)
                .await
            {
                Ok(data) => data,
                Err(e) => {
                    warn!(
                        "Baseline fetch failed for {} '{}': {}",
                        operation.entity_type, operation.entity_id, e
                    );
                    self.events.emit(EngineEvent::DetectionError {
                        entity_id: operation.entity_id.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let Some(mut conflict) = self.classifier.detect(operation, server_data.as_ref())
            else {
                continue;
            };
            conflict.suggestions = self.ranker.rank(&conflict, &self.catalog, self.config.network);
            detected.push(conflict);
        }

        if !detected.is_empty() {
            info!(
                "Detected {} conflicts in batch of {}",
                detected.len(),
                operations.len()
            );
            let snapshot = {
                let mut state = self.state.write().await;
                state.open.extend(detected.iter().cloned());
                state.open.clone()
            };
            self.persistence.save(CONFLICTS_KEY, &snapshot).await;
            self.events.emit(EngineEvent::ConflictsDetected {
                conflicts: detected.clone(),
            });
        }

        detected
    }

    // ── Resolution ───────────────────────────────────────────────

    /// Resolves an open conflict with the given strategy, or the
    /// configured default when none is supplied.
    ///
    /// Failures leave the conflict open and are returned to the caller —
    /// an explicit resolve is a direct user action and the caller needs
    /// to know it did not take effect.
    pub async fn resolve_conflict(
        &self,
        conflict_id: &ConflictId,
        strategy: Option<&str>,
    ) -> EngineResult<Resolution> {
        let (conflict, default_strategy) = {
            let state = self.state.read().await;
            let conflict = state
                .open
                .iter()
                .find(|c| &c.id == conflict_id)
                .cloned()
                .ok_or_else(|| EngineError::ConflictNotFound(conflict_id.clone()))?;
            (conflict, state.preferences.default_strategy.clone())
        };
        let strategy = strategy.unwrap_or(&default_strategy);

        match self.finalize(&conflict, strategy, ResolvedBy::User).await {
            Ok(resolution) => Ok(resolution),
            Err(e) => {
                self.events.emit(EngineEvent::ConflictResolutionError {
                    conflict_id: conflict.id.clone(),
                    strategy: strategy.to_string(),
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Attempts unattended resolution for each conflict independently.
    ///
    /// Conflicts whose top suggestion clears the policy resolve with that
    /// suggestion's strategy; the rest stay open and emit
    /// `ConflictRequiresManualResolution`. One failure never blocks the
    /// rest of the batch.
    pub async fn auto_resolve_conflicts(&self, conflicts: &[Conflict]) -> Vec<Resolution> {
        let mut resolutions = Vec::new();

        for conflict in conflicts {
            if !self.policy.should_auto_resolve(conflict) {
                debug!("Conflict {} below auto-resolve bar", conflict.id);
                self.events.emit(EngineEvent::ConflictRequiresManualResolution {
                    conflict_id: conflict.id.clone(),
                });
                continue;
            }
            let Some(top) = conflict.top_suggestion() else {
                continue;
            };

            match self.finalize(conflict, &top.strategy, ResolvedBy::Auto).await {
                Ok(resolution) => resolutions.push(resolution),
                Err(e) => {
                    warn!("Auto-resolve failed for {}: {}", conflict.id, e);
                    self.events.emit(EngineEvent::AutoResolveError {
                        conflict_id: conflict.id.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Auto-resolved {}/{} conflicts",
            resolutions.len(),
            conflicts.len()
        );
        resolutions
    }

    /// Applies a strategy and finalizes the resolution: append to history
    /// (evicting the oldest beyond the cap), remove from the open set,
    /// persist both collections, emit `ConflictResolved`. Atomic from the
    /// caller's perspective — on any failure the conflict remains open
    /// and nothing is recorded.
    async fn finalize(
        &self,
        conflict: &Conflict,
        strategy: &str,
        resolved_by: ResolvedBy,
    ) -> EngineResult<Resolution> {
        let outcome = executor::apply_strategy(conflict, strategy, &self.catalog)?;

        let resolution = Resolution {
            conflict_id: conflict.id.clone(),
            strategy: strategy.to_string(),
            resolved_data: outcome.resolved_data,
            resolved_at: record::wall_clock_ms(),
            resolved_by,
            confidence: outcome.confidence,
        };

        let (open_snapshot, history_snapshot) = {
            let mut state = self.state.write().await;
            let Some(position) = state.open.iter().position(|c| c.id == conflict.id) else {
                return Err(EngineError::ConflictNotFound(conflict.id.clone()));
            };
            state.open.remove(position);
            state.history.push(resolution.clone());
            if state.history.len() > self.config.max_history {
                let excess = state.history.len() - self.config.max_history;
                state.history.drain(..excess);
            }
            (state.open.clone(), state.history.clone())
        };

        self.persistence.save(CONFLICTS_KEY, &open_snapshot).await;
        self.persistence.save(HISTORY_KEY, &history_snapshot).await;

        debug!(
            "Resolved conflict {} with '{}'",
            resolution.conflict_id, resolution.strategy
        );
        self.events.emit(EngineEvent::ConflictResolved {
            resolution: resolution.clone(),
        });
        Ok(resolution)
    }

    // ── Introspection & preferences ──────────────────────────────

    /// Snapshot of the open conflict set.
    pub async fn conflicts(&self) -> Vec<Conflict> {
        self.state.read().await.open.clone()
    }

    /// Snapshot of the resolution history, oldest first.
    pub async fn history(&self) -> Vec<Resolution> {
        self.state.read().await.history.clone()
    }

    /// Clears all open conflicts without resolving them.
    pub async fn clear_conflicts(&self) {
        let snapshot = {
            let mut state = self.state.write().await;
            state.open.clear();
            state.open.clone()
        };
        self.persistence.save(CONFLICTS_KEY, &snapshot).await;
    }

    /// Sets the default strategy used when a resolve call supplies none.
    /// The name must be a baseline or a registered catalog strategy.
    pub async fn set_resolution_strategy(&self, strategy: &str) -> EngineResult<()> {
        if !self.is_known_strategy(strategy) {
            return Err(EngineError::UnknownStrategy(strategy.to_string()));
        }

        let preferences = {
            let mut state = self.state.write().await;
            state.preferences.default_strategy = strategy.to_string();
            state.preferences.clone()
        };
        self.persistence.save(PREFERENCES_KEY, &preferences).await;
        Ok(())
    }

    /// The currently configured default strategy.
    pub async fn default_strategy(&self) -> String {
        self.state.read().await.preferences.default_strategy.clone()
    }

    /// Strategy names available to resolve with: the fixed baselines plus
    /// every registered catalog strategy.
    pub fn resolution_strategies(&self) -> Vec<String> {
        let mut names: Vec<String> = BASELINE_STRATEGIES
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        names.extend(self.catalog.names());
        names
    }

    fn is_known_strategy(&self, name: &str) -> bool {
        BASELINE_STRATEGIES.contains(&name)
            || name == executor::MERGE_ALIAS
            || self.catalog.get(name).is_some()
    }
}
