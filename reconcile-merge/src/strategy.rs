//! The merge strategy interface.

use reconcile_types::Conflict;
use serde_json::Value;

/// A named, pure merge algorithm with an associated confidence estimator.
///
/// Implementations are stateless. `merge` must be a pure function of its
/// three inputs — no I/O, no mutation — so `confidence` remains a valid
/// estimate for the exact output `merge` produces.
pub trait MergeStrategy: Send + Sync {
    /// Registry name, stable across versions (recorded in resolutions).
    fn name(&self) -> &'static str;

    /// Human-readable summary shown in suggestions.
    fn description(&self) -> &'static str;

    /// Entity types this strategy applies to. Empty means all types.
    fn applicable_entity_types(&self) -> &'static [&'static str] {
        &[]
    }

    /// Whether this strategy can merge records of the given entity type.
    fn applies_to(&self, entity_type: &str) -> bool {
        let types = self.applicable_entity_types();
        types.is_empty() || types.contains(&entity_type)
    }

    /// Produces the merged record for the conflict's two sides.
    fn merge(&self, local: &Value, server: &Value, conflict: &Conflict) -> Value;

    /// Estimates how likely `merge`'s output is to be the intended result,
    /// in `[0, 1]`.
    fn confidence(&self, local: &Value, server: &Value, conflict: &Conflict) -> f64;
}
