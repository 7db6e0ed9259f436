//! HTTP query service client for qbench.
//!
//! Talks to a query API that exposes one endpoint per backend:
//!
//! ```text
//! POST {base_url}/query/warehouse   {"query": "..."}
//! POST {base_url}/query/normalized  {"query": "..."}
//! ```
//!
//! Both answer with `{data, execution_time_ms, row_count, columns}` on
//! success. Errors carry a JSON body with a `detail` field.

use async_trait::async_trait;
use qbench_backend::{BackendError, BackendId, QueryRequest, QueryResult, QueryService};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct HttpServiceConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for HttpServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl HttpServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Query service reached over HTTP.
///
/// `reqwest::Client` is internally pooled and cheap to share; concurrent
/// calls for the two backends use independent requests.
pub struct HttpQueryService {
    config: HttpServiceConfig,
    client: reqwest::Client,
}

impl HttpQueryService {
    pub fn new(config: HttpServiceConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BackendError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// URL of the query endpoint for `backend`.
    pub fn endpoint(&self, backend: BackendId) -> String {
        format!(
            "{}/query/{}",
            self.config.base_url.trim_end_matches('/'),
            backend.as_str()
        )
    }

    fn transport_error(backend: BackendId, err: reqwest::Error) -> BackendError {
        if err.is_timeout() {
            BackendError::Timeout { backend }
        } else if err.is_decode() {
            BackendError::invalid_response(backend, err.to_string())
        } else {
            BackendError::connection_failed(backend, err.to_string())
        }
    }
}

/// Pull a human-readable message out of an error response.
fn error_detail(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned());

    match detail {
        Some(Value::String(message)) => message,
        Some(other) => other.to_string(),
        None => format!("Request failed with status code {}", status.as_u16()),
    }
}

#[async_trait]
impl QueryService for HttpQueryService {
    async fn execute(&self, backend: BackendId, query: &str) -> Result<QueryResult, BackendError> {
        let url = self.endpoint(backend);
        debug!(backend = %backend, url = %url, "Sending query");

        let response = self
            .client
            .post(&url)
            .json(&QueryRequest::new(query))
            .send()
            .await
            .map_err(|e| Self::transport_error(backend, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::execution_failed(
                backend,
                error_detail(status, &body),
            ));
        }

        response
            .json::<QueryResult>()
            .await
            .map_err(|e| Self::transport_error(backend, e))
    }

    fn kind(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn service(base_url: String) -> HttpQueryService {
        HttpQueryService::new(HttpServiceConfig::new(base_url)).unwrap()
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let service = service("http://localhost:8000/api/".to_string());
        assert_eq!(
            service.endpoint(BackendId::Warehouse),
            "http://localhost:8000/api/query/warehouse"
        );
        assert_eq!(
            service.endpoint(BackendId::Normalized),
            "http://localhost:8000/api/query/normalized"
        );
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(
            error_detail(StatusCode::BAD_REQUEST, r#"{"detail": "syntax error"}"#),
            "syntax error"
        );
        assert_eq!(
            error_detail(StatusCode::INTERNAL_SERVER_ERROR, "oops"),
            "Request failed with status code 500"
        );
        assert_eq!(
            error_detail(StatusCode::UNPROCESSABLE_ENTITY, r#"{"detail": [{"msg": "bad"}]}"#),
            r#"[{"msg":"bad"}]"#
        );
    }

    #[tokio::test]
    async fn test_execute_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/query/warehouse")
            .match_body(Matcher::Json(json!({"query": "SELECT COUNT(*) FROM flights"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data": [[1000000]], "execution_time_ms": 50.0, "row_count": 1, "columns": ["count"]}"#,
            )
            .create_async()
            .await;

        let result = service(server.url())
            .execute(BackendId::Warehouse, "SELECT COUNT(*) FROM flights")
            .await
            .unwrap();

        assert_eq!(result.execution_time_ms, 50.0);
        assert_eq!(result.row_count, 1);
        assert_eq!(result.columns, vec!["count".to_string()]);
        assert_eq!(result.data, vec![json!([1000000])]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_execute_error_detail() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/query/normalized")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail": "table not found"}"#)
            .create_async()
            .await;

        let err = service(server.url())
            .execute(BackendId::Normalized, "SELECT * FROM nope")
            .await
            .unwrap_err();

        assert_eq!(err.reason(), "table not found");
        assert!(matches!(
            err,
            BackendError::ExecutionFailed {
                backend: BackendId::Normalized,
                ..
            }
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_execute_invalid_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/query/warehouse")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"rows": []}"#)
            .create_async()
            .await;

        let err = service(server.url())
            .execute(BackendId::Warehouse, "SELECT 1")
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let err = service("http://127.0.0.1:1".to_string())
            .execute(BackendId::Warehouse, "SELECT 1")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BackendError::ConnectionFailed {
                backend: BackendId::Warehouse,
                ..
            }
        ));
    }
}
