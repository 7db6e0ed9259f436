//! The aggregate owned by one comparison run.

use crate::{ComparisonError, ComparisonMetrics, ExecutionOutcome};
use qbench_backend::{BackendId, QueryResult};
use serde::{Deserialize, Serialize};

/// Lifecycle of a comparison run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// At least one backend is still pending, or the join has not been
    /// reconciled yet.
    #[default]
    Running,
    /// Both backends succeeded and metrics were derived.
    CompleteSuccess,
    /// At least one backend failed; no metrics.
    CompleteFailure,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

/// State of one comparison run.
///
/// Each backend's outcome lives in its own field and is written once.
/// `metrics` is only filled by [`finalize`](Self::finalize), after both
/// outcomes have left `Pending`, and only when both succeeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonState {
    query: String,
    warehouse: ExecutionOutcome,
    normalized: ExecutionOutcome,
    status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<ComparisonMetrics>,
}

impl ComparisonState {
    /// Fresh state with both backends pending.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            warehouse: ExecutionOutcome::Pending,
            normalized: ExecutionOutcome::Pending,
            status: RunStatus::Running,
            metrics: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn outcome(&self, backend: BackendId) -> &ExecutionOutcome {
        match backend {
            BackendId::Warehouse => &self.warehouse,
            BackendId::Normalized => &self.normalized,
        }
    }

    pub fn warehouse(&self) -> &ExecutionOutcome {
        &self.warehouse
    }

    pub fn normalized(&self) -> &ExecutionOutcome {
        &self.normalized
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn metrics(&self) -> Option<&ComparisonMetrics> {
        self.metrics.as_ref()
    }

    /// Both outcomes have left `Pending`.
    pub fn is_settled(&self) -> bool {
        !self.warehouse.is_pending() && !self.normalized.is_pending()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Record `backend`'s outcome.
    ///
    /// Returns false (and changes nothing) if that backend already resolved
    /// or `outcome` is `Pending`.
    pub fn record(&mut self, backend: BackendId, outcome: ExecutionOutcome) -> bool {
        if outcome.is_pending() {
            return false;
        }

        let slot = match backend {
            BackendId::Warehouse => &mut self.warehouse,
            BackendId::Normalized => &mut self.normalized,
        };

        if !slot.is_pending() {
            return false;
        }

        *slot = outcome;
        true
    }

    /// Fail every backend that is still pending with `reason`.
    pub fn fail_pending(&mut self, reason: &str) {
        for backend in BackendId::ALL {
            self.record(backend, ExecutionOutcome::failed(reason));
        }
    }

    /// Reconcile both outcomes into a terminal status.
    ///
    /// No-op until the state is settled, and after it is already terminal.
    /// Returns true when this call moved the run into its terminal state.
    pub fn finalize(&mut self) -> bool {
        if !self.is_settled() || self.is_terminal() {
            return false;
        }

        match (self.warehouse.result(), self.normalized.result()) {
            (Some(warehouse), Some(normalized)) => {
                self.metrics = Some(ComparisonMetrics::derive(
                    warehouse.execution_time_ms,
                    normalized.execution_time_ms,
                ));
                self.status = RunStatus::CompleteSuccess;
            }
            _ => {
                self.metrics = None;
                self.status = RunStatus::CompleteFailure;
            }
        }

        true
    }

    /// The failure of a run that ended in `CompleteFailure`.
    pub fn error(&self) -> Option<ComparisonError> {
        if self.status != RunStatus::CompleteFailure {
            return None;
        }

        match (
            self.warehouse.failure_reason(),
            self.normalized.failure_reason(),
        ) {
            (Some(warehouse), Some(normalized)) => Some(ComparisonError::TotalFailure {
                warehouse: warehouse.to_string(),
                normalized: normalized.to_string(),
            }),
            (Some(reason), None) => Some(ComparisonError::PartialFailure {
                backend: BackendId::Warehouse,
                reason: reason.to_string(),
            }),
            (None, Some(reason)) => Some(ComparisonError::PartialFailure {
                backend: BackendId::Normalized,
                reason: reason.to_string(),
            }),
            (None, None) => None,
        }
    }

    /// Convert a terminal state into the comparison payload.
    pub fn into_result(self) -> Result<ComparisonResult, ComparisonError> {
        match self.status {
            RunStatus::Running => Err(ComparisonError::Incomplete),
            RunStatus::CompleteFailure => Err(self.error().unwrap_or(ComparisonError::Incomplete)),
            RunStatus::CompleteSuccess => match (self.warehouse, self.normalized, self.metrics) {
                (
                    ExecutionOutcome::Succeeded(warehouse),
                    ExecutionOutcome::Succeeded(normalized),
                    Some(metrics),
                ) => Ok(ComparisonResult {
                    warehouse,
                    normalized,
                    comparison: metrics.rounded(),
                }),
                _ => Err(ComparisonError::Incomplete),
            },
        }
    }
}

/// Side-by-side result of a successful comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub warehouse: QueryResult,
    pub normalized: QueryResult,
    /// Metrics rounded for presentation.
    pub comparison: ComparisonMetrics,
}

impl ComparisonResult {
    pub fn result(&self, backend: BackendId) -> &QueryResult {
        match backend {
            BackendId::Warehouse => &self.warehouse,
            BackendId::Normalized => &self.normalized,
        }
    }
}
