//! Query service trait and types for qbench backends.
//!
//! This crate defines the interface the comparison orchestrator uses to run a
//! query against either backend, enabling multiple transports (HTTP, DuckDB).

mod backend_id;
mod error;
mod routed;
mod types;

pub use backend_id::BackendId;
pub use error::BackendError;
pub use routed::RoutedQueryService;
pub use types::{QueryRequest, QueryResult, Row};

use async_trait::async_trait;

/// Abstract interface for executing a query against a named backend.
///
/// Implementations must be safe to call concurrently for both backends with
/// the same query; the two calls share no mutable state.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Execute a query against `backend` and return its rows and timing.
    async fn execute(&self, backend: BackendId, query: &str) -> Result<QueryResult, BackendError>;

    /// Short name of the transport, for display.
    fn kind(&self) -> &'static str;
}
