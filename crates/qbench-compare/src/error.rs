//! Comparison error types.

use qbench_backend::BackendId;
use thiserror::Error;

/// Why a comparison run did not produce metrics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComparisonError {
    /// Exactly one backend failed. The other backend's result is still held
    /// by the comparison state.
    #[error("{} query failed: {}", .backend.name(), .reason)]
    PartialFailure { backend: BackendId, reason: String },

    /// Both backends failed.
    #[error("Warehouse query failed: {warehouse}; Normalized query failed: {normalized}")]
    TotalFailure { warehouse: String, normalized: String },

    /// The run has not reached a terminal state.
    #[error("Comparison has not finished")]
    Incomplete,
}
