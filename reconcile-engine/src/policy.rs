//! Auto-resolution gating.

use reconcile_types::Conflict;

/// Default confidence a top suggestion must clear for unattended
/// resolution.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Decides, per conflict, whether the top suggestion may be applied
/// without a human.
#[derive(Debug, Clone, Copy)]
pub struct AutoResolvePolicy {
    /// Minimum top-suggestion confidence for unattended resolution.
    pub confidence_threshold: f64,
    /// Global switch; when false every conflict queues for manual review.
    pub enabled: bool,
}

impl Default for AutoResolvePolicy {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            enabled: true,
        }
    }
}

impl AutoResolvePolicy {
    /// Creates a policy.
    #[must_use]
    pub fn new(confidence_threshold: f64, enabled: bool) -> Self {
        Self {
            confidence_threshold,
            enabled,
        }
    }

    /// True iff auto-resolution is enabled and the conflict's top
    /// suggestion clears the confidence bar.
    #[must_use]
    pub fn should_auto_resolve(&self, conflict: &Conflict) -> bool {
        self.enabled
            && conflict
                .top_suggestion()
                .is_some_and(|s| s.confidence >= self.confidence_threshold)
    }
}
