//! Common types used across query services.

use serde::{Deserialize, Serialize};

/// A single result row as returned by a backend.
///
/// Rows are kept as opaque JSON so that whatever the service returns (arrays
/// in column order, or objects keyed by column) reaches the caller unchanged.
pub type Row = serde_json::Value;

/// Body of a query request sent to a query service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// Result of executing one query against one backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Result rows, in the order the backend produced them.
    #[serde(default)]
    pub data: Vec<Row>,

    /// How long execution took on the backend, in milliseconds.
    pub execution_time_ms: f64,

    /// Number of rows produced.
    pub row_count: u64,

    /// Column names, in order.
    #[serde(default)]
    pub columns: Vec<String>,
}

impl QueryResult {
    /// Build a result whose row count is taken from `data`.
    pub fn new(columns: Vec<String>, data: Vec<Row>, execution_time_ms: f64) -> Self {
        Self {
            row_count: data.len() as u64,
            data,
            execution_time_ms,
            columns,
        }
    }
}
