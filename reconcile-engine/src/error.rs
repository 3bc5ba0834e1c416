//! Error types for the conflict engine.

use reconcile_types::ConflictId;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur in engine operations.
///
/// Classification and batch-auto-resolve failures are recovered locally
/// (per item, surfaced as events); explicit resolve failures are returned
/// to the caller. Nothing here is fatal to the process — the worst outcome
/// is a conflict remaining open, which is a correct and visible state.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The `manual` strategy cannot be executed directly; the caller must
    /// supply a concrete resolution out-of-band.
    #[error("strategy 'manual' requires caller-supplied resolution data")]
    ManualResolutionRequired,

    /// The strategy name is neither a baseline nor registered.
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    /// No open conflict with this id.
    #[error("conflict not found: {0}")]
    ConflictNotFound(ConflictId),

    /// A single operation's classification failed.
    #[error("detection failed: {0}")]
    Detection(String),

    /// Store collaborator error.
    #[error("store error: {0}")]
    Store(#[from] crate::store::StoreError),

    /// Fetch collaborator error.
    #[error("fetch error: {0}")]
    Fetch(#[from] crate::fetch::FetchError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
