//! Engine error taxonomy.

use thiserror::Error;

use crate::repo::RepoError;

/// Errors surfaced by the risk quantification engine.
///
/// Pure scoring functions fail fast on invalid input; batch components
/// (recalculation, aggregation, import) convert per-item failures into
/// itemized reports instead of propagating the first error. Nothing in this
/// core retries automatically.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A numeric input fell outside its documented domain. Never silently
    /// clamped.
    #[error("{field} out of range: {value} (expected {min} to {max})")]
    InvalidRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A referenced entity could not be resolved.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The operation conflicts with current state (recalculation already
    /// running, dependency cycle introduced). The caller must retry later;
    /// conflicting work is never queued.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A risk record references an entity that no longer resolves.
    /// Surfaced per record in bulk passes, not fatal to the pass.
    #[error("dangling {entity} reference: {id}")]
    DanglingReference { entity: &'static str, id: String },

    /// One aggregation input was unavailable. Degrades the affected KPI
    /// field; never aborts the snapshot.
    #[error("stats source '{name}' unavailable: {reason}")]
    PartialSourceFailure { name: String, reason: String },

    /// A creation request failed field validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Error from a repository collaborator.
    #[error("repository error: {0}")]
    Repository(#[from] RepoError),
}

impl From<validator::ValidationErrors> for EngineError {
    fn from(err: validator::ValidationErrors) -> Self {
        EngineError::Validation(err.to_string())
    }
}
