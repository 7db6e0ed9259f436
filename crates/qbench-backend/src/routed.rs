//! Per-backend dispatch.

use crate::{BackendError, BackendId, QueryResult, QueryService};
use async_trait::async_trait;
use std::sync::Arc;

/// Query service that sends each backend to its own underlying service.
///
/// Lets the warehouse be served over HTTP while the normalized store is a
/// local DuckDB file, or any other mix.
#[derive(Clone)]
pub struct RoutedQueryService {
    warehouse: Arc<dyn QueryService>,
    normalized: Arc<dyn QueryService>,
}

impl RoutedQueryService {
    pub fn new(warehouse: Arc<dyn QueryService>, normalized: Arc<dyn QueryService>) -> Self {
        Self {
            warehouse,
            normalized,
        }
    }

    /// The service handling `backend`.
    pub fn service(&self, backend: BackendId) -> &Arc<dyn QueryService> {
        match backend {
            BackendId::Warehouse => &self.warehouse,
            BackendId::Normalized => &self.normalized,
        }
    }
}

#[async_trait]
impl QueryService for RoutedQueryService {
    async fn execute(&self, backend: BackendId, query: &str) -> Result<QueryResult, BackendError> {
        self.service(backend).execute(backend, query).await
    }

    fn kind(&self) -> &'static str {
        "routed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        kind: &'static str,
        time_ms: f64,
    }

    #[async_trait]
    impl QueryService for Fixed {
        async fn execute(
            &self,
            _backend: BackendId,
            _query: &str,
        ) -> Result<QueryResult, BackendError> {
            Ok(QueryResult::new(vec![], vec![], self.time_ms))
        }

        fn kind(&self) -> &'static str {
            self.kind
        }
    }

    #[tokio::test]
    async fn test_routes_by_backend() {
        let routed = RoutedQueryService::new(
            Arc::new(Fixed {
                kind: "http",
                time_ms: 1.0,
            }),
            Arc::new(Fixed {
                kind: "duckdb",
                time_ms: 2.0,
            }),
        );

        let warehouse = routed.execute(BackendId::Warehouse, "SELECT 1").await.unwrap();
        let normalized = routed.execute(BackendId::Normalized, "SELECT 1").await.unwrap();

        assert_eq!(warehouse.execution_time_ms, 1.0);
        assert_eq!(normalized.execution_time_ms, 2.0);
        assert_eq!(routed.service(BackendId::Normalized).kind(), "duckdb");
    }
}
