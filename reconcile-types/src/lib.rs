//! Core type definitions for the Reconcile conflict engine.
//!
//! This crate defines the fundamental, schema-agnostic types shared by the
//! merge and engine crates:
//! - Local mutations awaiting reconciliation ([`Operation`])
//! - Detected disagreements between replicas ([`Conflict`]) and their
//!   classification ([`Severity`], [`ConflictKind`])
//! - Ranked resolution recommendations ([`Suggestion`])
//! - The immutable audit record of a settled conflict ([`Resolution`])
//! - Generic helpers over opaque JSON records ([`record`])
//!
//! Domain-specific record schemas (tasks, notes, whatever the host
//! application syncs) do not belong here — the engine treats record
//! contents as an opaque field-to-value mapping.

mod conflict;
mod ids;
mod operation;
pub mod record;

pub use conflict::{Conflict, ConflictKind, Resolution, ResolvedBy, Risk, Severity, Suggestion};
pub use ids::ConflictId;
pub use operation::{Operation, OperationKind};
