//! The merge strategy registry.

use crate::concatenation::ConcatenationMerge;
use crate::field_level::FieldLevelMerge;
use crate::priority::PriorityMerge;
use crate::smart::SmartMerge;
use crate::strategy::MergeStrategy;
use crate::timestamp_wins::TimestampWins;
use crate::union::UnionMerge;
use std::fmt;
use std::sync::Arc;

/// Registry of named merge strategies.
///
/// Registration order is preserved — suggestion ranking breaks confidence
/// ties by catalog order, so it must be deterministic. Registering a
/// strategy under an existing name replaces the earlier entry in place
/// (boot-time last-write-wins; the catalog is not mutated at runtime).
#[derive(Clone, Default)]
pub struct StrategyCatalog {
    strategies: Vec<Arc<dyn MergeStrategy>>,
}

impl StrategyCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Catalog preloaded with the built-in strategies in their fixed
    /// registration order.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register(Arc::new(TimestampWins));
        catalog.register(Arc::new(FieldLevelMerge));
        catalog.register(Arc::new(PriorityMerge));
        catalog.register(Arc::new(ConcatenationMerge));
        catalog.register(Arc::new(UnionMerge));
        catalog.register(Arc::new(SmartMerge));
        catalog
    }

    /// Registers a strategy. An existing entry with the same name is
    /// replaced in place, keeping its position in the ordering.
    pub fn register(&mut self, strategy: Arc<dyn MergeStrategy>) {
        match self
            .strategies
            .iter()
            .position(|s| s.name() == strategy.name())
        {
            Some(index) => self.strategies[index] = strategy,
            None => self.strategies.push(strategy),
        }
    }

    /// Looks up a strategy by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn MergeStrategy>> {
        self.strategies.iter().find(|s| s.name() == name)
    }

    /// Iterates strategies in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn MergeStrategy>> {
        self.strategies.iter()
    }

    /// Registered strategy names, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.strategies
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    /// Number of registered strategies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl fmt::Debug for StrategyCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyCatalog")
            .field("strategies", &self.names())
            .finish()
    }
}
