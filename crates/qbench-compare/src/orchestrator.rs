//! Runs one query against both backends and reconciles the outcomes.

use crate::notify::{Notification, NotificationSink, NullSink, Severity};
use crate::{ComparisonError, ComparisonResult, ComparisonState, ExecutionOutcome};
use qbench_backend::{BackendError, BackendId, QueryResult, QueryService};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Starts comparison runs against a query service.
///
/// Cheap to clone; every run gets its own state and tasks.
#[derive(Clone)]
pub struct Orchestrator {
    service: Arc<dyn QueryService>,
    sink: Arc<dyn NotificationSink>,
    timeout: Option<Duration>,
}

impl Orchestrator {
    pub fn new(service: Arc<dyn QueryService>) -> Self {
        Self {
            service,
            sink: Arc::new(NullSink),
            timeout: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Fail a backend call that has not resolved within `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Start a comparison run for `query`.
    ///
    /// Both backend calls are spawned before this returns. Must be called from
    /// within a tokio runtime.
    pub fn run_comparison(&self, query: impl Into<String>) -> ComparisonRun {
        let state = ComparisonState::new(query);
        info!(query = %state.query(), "Starting comparison");

        let (state_tx, state_rx) = watch::channel(state.clone());

        let warehouse = self.spawn_backend(BackendId::Warehouse, state.query());
        let normalized = self.spawn_backend(BackendId::Normalized, state.query());

        let driver = tokio::spawn(drive(
            state,
            warehouse,
            normalized,
            state_tx,
            Arc::clone(&self.sink),
        ));

        ComparisonRun {
            state_rx,
            driver,
            sink: Arc::clone(&self.sink),
        }
    }

    /// Run a comparison to completion.
    pub async fn compare(
        &self,
        query: impl Into<String>,
    ) -> Result<ComparisonResult, ComparisonError> {
        self.run_comparison(query).finish().await.into_result()
    }

    /// Execute `query` against a single backend, outside any comparison.
    pub async fn execute_one(
        &self,
        backend: BackendId,
        query: &str,
    ) -> Result<QueryResult, BackendError> {
        execute_with_timeout(self.service.as_ref(), backend, query, self.timeout).await
    }

    fn spawn_backend(&self, backend: BackendId, query: &str) -> JoinHandle<ExecutionOutcome> {
        let service = Arc::clone(&self.service);
        let query = query.to_string();
        let timeout = self.timeout;

        tokio::spawn(async move {
            let result = execute_with_timeout(service.as_ref(), backend, &query, timeout).await;
            match &result {
                Ok(r) => debug!(
                    backend = %backend,
                    rows = r.row_count,
                    elapsed_ms = r.execution_time_ms,
                    "Backend call succeeded"
                ),
                Err(e) => warn!(backend = %backend, error = %e, "Backend call failed"),
            }
            ExecutionOutcome::from_result(result)
        })
    }
}

async fn execute_with_timeout(
    service: &dyn QueryService,
    backend: BackendId,
    query: &str,
    timeout: Option<Duration>,
) -> Result<QueryResult, BackendError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, service.execute(backend, query))
            .await
            .unwrap_or_else(|_| Err(BackendError::Timeout { backend })),
        None => service.execute(backend, query).await,
    }
}

/// Owns the state of one run: records each backend as it resolves, then
/// reconciles once both handles have joined.
async fn drive(
    mut state: ComparisonState,
    mut warehouse: JoinHandle<ExecutionOutcome>,
    mut normalized: JoinHandle<ExecutionOutcome>,
    state_tx: watch::Sender<ComparisonState>,
    sink: Arc<dyn NotificationSink>,
) -> ComparisonState {
    while !state.is_settled() {
        let (backend, joined) = tokio::select! {
            joined = &mut warehouse, if state.warehouse().is_pending() => {
                (BackendId::Warehouse, joined)
            }
            joined = &mut normalized, if state.normalized().is_pending() => {
                (BackendId::Normalized, joined)
            }
        };

        // A panicking task still resolves its backend.
        let outcome = joined
            .unwrap_or_else(|e| ExecutionOutcome::failed(format!("execution task aborted: {}", e)));

        // Publish before the sink sees it.
        if state.record(backend, outcome) {
            state_tx.send_replace(state.clone());
            sink.notify(progress_notification(backend, state.outcome(backend)));
        }
    }

    let finalized = state.finalize();
    state_tx.send_replace(state.clone());
    if finalized {
        log_terminal(&state);
        sink.notify(terminal_notification(&state));
    }

    state
}

fn progress_notification(backend: BackendId, outcome: &ExecutionOutcome) -> Notification {
    match outcome {
        ExecutionOutcome::Succeeded(result) => Notification::progress(
            Severity::Info,
            format!(
                "{} finished in {:.2} ms ({} rows)",
                backend.name(),
                result.execution_time_ms,
                result.row_count
            ),
        ),
        ExecutionOutcome::Failed { reason } => Notification::progress(
            Severity::Warning,
            format!("{} query failed: {}", backend.name(), reason),
        ),
        ExecutionOutcome::Pending => {
            Notification::progress(Severity::Info, format!("{} running", backend.name()))
        }
    }
}

fn terminal_notification(state: &ComparisonState) -> Notification {
    match (state.metrics(), state.error()) {
        (Some(metrics), _) => Notification::terminal(
            Severity::Success,
            format!(
                "Comparison complete! Warehouse is {:.2}× faster",
                metrics.speedup
            ),
        ),
        (None, Some(error)) => Notification::terminal(Severity::Error, error.to_string()),
        (None, None) => Notification::terminal(Severity::Error, "Comparison failed"),
    }
}

fn log_terminal(state: &ComparisonState) {
    match (state.metrics(), state.error()) {
        (Some(metrics), _) => info!(
            speedup = metrics.speedup,
            improvement_pct = metrics.improvement_pct,
            time_saved_ms = metrics.time_saved_ms,
            "Comparison complete"
        ),
        (None, error) => {
            let message = error.map(|e| e.to_string()).unwrap_or_default();
            warn!(error = %message, "Comparison failed");
        }
    }
}

/// Handle to a running comparison.
///
/// Observers can read [`snapshot()`](Self::snapshot) at any time or
/// [`subscribe()`](Self::subscribe) to every state change. The terminal state
/// is always the last one published.
pub struct ComparisonRun {
    state_rx: watch::Receiver<ComparisonState>,
    driver: JoinHandle<ComparisonState>,
    sink: Arc<dyn NotificationSink>,
}

impl ComparisonRun {
    /// Current state (non-blocking).
    pub fn snapshot(&self) -> ComparisonState {
        self.state_rx.borrow().clone()
    }

    /// Receiver of every published state.
    pub fn subscribe(&self) -> watch::Receiver<ComparisonState> {
        self.state_rx.clone()
    }

    /// Wait for the run to reach its terminal state.
    pub async fn finish(self) -> ComparisonState {
        match self.driver.await {
            Ok(state) => state,
            Err(e) => {
                let mut state = self.state_rx.borrow().clone();
                state.fail_pending(&format!("comparison aborted: {}", e));
                if state.finalize() {
                    self.sink.notify(terminal_notification(&state));
                    log_terminal(&state);
                }
                state
            }
        }
    }
}
