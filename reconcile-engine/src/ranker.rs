//! Suggestion ranking.
//!
//! Combines classifier output with the strategy catalog to produce the
//! ordered list of resolution options attached to every conflict.

use crate::engine::NetworkConditions;
use reconcile_merge::StrategyCatalog;
use reconcile_types::{Conflict, Risk, Suggestion};
use std::cmp::Ordering;

/// Confidence assigned to the unconditional local/server baselines.
const BASELINE_CONFIDENCE: f64 = 0.5;

/// Floor below which a catalog strategy is not worth suggesting.
const SUGGESTION_FLOOR: f64 = 0.3;

/// Produces the full, ordered suggestion list for a conflict.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuggestionRanker;

impl SuggestionRanker {
    /// Creates a ranker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Ranks resolution options for a conflict.
    ///
    /// The `local_wins` / `server_wins` baselines are always present so a
    /// human has a deterministic fallback even when no merge strategy
    /// applies. Applicable catalog strategies clearing the confidence
    /// floor follow. The final list is sorted descending by confidence;
    /// the sort is stable, so ties keep catalog registration order.
    #[must_use]
    pub fn rank(
        &self,
        conflict: &Conflict,
        catalog: &StrategyCatalog,
        network: NetworkConditions,
    ) -> Vec<Suggestion> {
        let mut suggestions = vec![
            Suggestion {
                strategy: "local_wins".to_string(),
                description: "Keep the local version".to_string(),
                confidence: BASELINE_CONFIDENCE,
                risk: Risk::Low,
            },
            Suggestion {
                strategy: "server_wins".to_string(),
                description: "Keep the server version".to_string(),
                confidence: BASELINE_CONFIDENCE,
                risk: Risk::Low,
            },
        ];

        for strategy in catalog.iter() {
            if !strategy.applies_to(&conflict.operation.entity_type) {
                continue;
            }
            let confidence =
                strategy.confidence(&conflict.local_data, &conflict.server_data, conflict);
            if confidence > SUGGESTION_FLOOR {
                suggestions.push(Suggestion {
                    strategy: strategy.name().to_string(),
                    description: strategy.description().to_string(),
                    confidence,
                    risk: risk_for(strategy.name(), network),
                });
            }
        }

        suggestions.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });
        suggestions
    }
}

/// Fixed risk table. Offline smart-merges work from a connectivity state
/// that may already be stale, so they rank riskier.
fn risk_for(strategy: &str, network: NetworkConditions) -> Risk {
    match strategy {
        "local_wins" | "server_wins" => Risk::Low,
        "smart_merge" if !network.online => Risk::High,
        _ => Risk::Medium,
    }
}
