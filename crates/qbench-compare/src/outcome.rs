//! Per-backend execution outcomes.

use qbench_backend::{BackendError, QueryResult};
use serde::Serialize;

/// Where one backend's call stands.
///
/// Moves from `Pending` to exactly one of `Succeeded` or `Failed` and then
/// never changes again.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    #[default]
    Pending,
    Succeeded(QueryResult),
    Failed { reason: String },
}

impl ExecutionOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        ExecutionOutcome::Failed {
            reason: reason.into(),
        }
    }

    pub fn from_result(result: Result<QueryResult, BackendError>) -> Self {
        match result {
            Ok(result) => ExecutionOutcome::Succeeded(result),
            Err(e) => ExecutionOutcome::failed(e.reason()),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ExecutionOutcome::Pending)
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, ExecutionOutcome::Succeeded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ExecutionOutcome::Failed { .. })
    }

    pub fn result(&self) -> Option<&QueryResult> {
        match self {
            ExecutionOutcome::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            ExecutionOutcome::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}
