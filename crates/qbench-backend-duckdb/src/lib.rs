//! DuckDB query service for qbench.

use anyhow::Context;
use async_trait::async_trait;
use duckdb::types::Value as DuckValue;
use duckdb::Connection;
use qbench_backend::{BackendError, BackendId, QueryResult, QueryService, Row};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::debug;

/// DuckDB-backed query service.
///
/// Wraps one database file. DuckDB operations are synchronous, so they're
/// wrapped in spawn_blocking. Uses Arc<Mutex<Connection>> since Connection is
/// not Sync; give each backend its own service so the two sides of a
/// comparison never contend for the same connection.
pub struct DuckDbQueryService {
    connection: Arc<Mutex<Connection>>,
    database_path: Option<PathBuf>,
}

impl DuckDbQueryService {
    /// Open (or create) a database file.
    pub async fn open(database_path: &Path) -> Result<Self, BackendError> {
        let path = database_path.to_owned();

        let connection = tokio::task::spawn_blocking(move || {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create directory: {:?}", parent))?;
                }
            }

            let connection = Connection::open(&path)
                .with_context(|| format!("Failed to open DuckDB database: {:?}", path))?;

            Ok::<_, anyhow::Error>(connection)
        })
        .await
        .map_err(|e| BackendError::configuration(e.to_string()))?
        .map_err(|e| BackendError::configuration(format!("{:#}", e)))?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
            database_path: Some(database_path.to_owned()),
        })
    }

    /// Open a transient in-memory database.
    pub fn open_in_memory() -> Result<Self, BackendError> {
        let connection = Connection::open_in_memory()
            .map_err(|e| BackendError::configuration(e.to_string()))?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
            database_path: None,
        })
    }

    /// Path of the underlying database file, if any.
    pub fn database_path(&self) -> Option<&Path> {
        self.database_path.as_deref()
    }

    /// Run statements that return no rows (DDL, inserts).
    pub async fn execute_batch(&self, sql: &str) -> Result<(), BackendError> {
        let connection = Arc::clone(&self.connection);
        let sql = sql.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = connection
                .lock()
                .map_err(|_| BackendError::configuration("DuckDB connection lock poisoned"))?;
            conn.execute_batch(&sql)
                .map_err(|e| BackendError::Other(anyhow::anyhow!(e)))
        })
        .await
        .map_err(|e| BackendError::Other(e.into()))?
    }
}

#[async_trait]
impl QueryService for DuckDbQueryService {
    async fn execute(&self, backend: BackendId, query: &str) -> Result<QueryResult, BackendError> {
        let connection = Arc::clone(&self.connection);
        let sql = query.to_string();

        let result = tokio::task::spawn_blocking(move || {
            let conn = connection
                .lock()
                .map_err(|_| BackendError::connection_failed(backend, "connection lock poisoned"))?;

            let start = Instant::now();
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| BackendError::execution_failed(backend, e.to_string()))?;

            let mut rows = stmt
                .query([])
                .map_err(|e| BackendError::execution_failed(backend, e.to_string()))?;

            let columns: Vec<String> = rows
                .as_ref()
                .map(|stmt| stmt.column_names())
                .unwrap_or_default();

            let mut data = Vec::new();
            while let Some(row) = rows
                .next()
                .map_err(|e| BackendError::execution_failed(backend, e.to_string()))?
            {
                data.push(read_row(row, columns.len()).map_err(|e| {
                    BackendError::invalid_response(backend, format!("{:#}", e))
                })?);
            }
            let execution_time_ms = start.elapsed().as_secs_f64() * 1000.0;

            Ok(QueryResult::new(columns, data, execution_time_ms))
        })
        .await
        .map_err(|e| BackendError::Other(e.into()))?;

        if let Ok(ref result) = result {
            debug!(
                backend = %backend,
                rows = result.row_count,
                elapsed_ms = result.execution_time_ms,
                "DuckDB query finished"
            );
        }

        result
    }

    fn kind(&self) -> &'static str {
        "duckdb"
    }
}

/// Read one row as a JSON array, by column position.
fn read_row(row: &duckdb::Row<'_>, column_count: usize) -> anyhow::Result<Row> {
    let values = (0..column_count)
        .map(|i| {
            row.get::<_, DuckValue>(i)
                .map(to_json)
                .with_context(|| format!("Failed to read column {}", i))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Value::Array(values))
}

fn to_json(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(b) => Value::Bool(b),
        DuckValue::TinyInt(n) => n.into(),
        DuckValue::SmallInt(n) => n.into(),
        DuckValue::Int(n) => n.into(),
        DuckValue::BigInt(n) => n.into(),
        DuckValue::HugeInt(n) => match i64::try_from(n) {
            Ok(n) => n.into(),
            Err(_) => Value::String(n.to_string()),
        },
        DuckValue::UTinyInt(n) => n.into(),
        DuckValue::USmallInt(n) => n.into(),
        DuckValue::UInt(n) => n.into(),
        DuckValue::UBigInt(n) => n.into(),
        // Non-finite floats become null.
        DuckValue::Float(n) => f64::from(n).into(),
        DuckValue::Double(n) => n.into(),
        DuckValue::Decimal(d) => {
            let text = d.to_string();
            text.parse::<f64>().map(Value::from).unwrap_or(Value::String(text))
        }
        DuckValue::Text(s) | DuckValue::Enum(s) => Value::String(s),
        DuckValue::Blob(bytes) => Value::Array(bytes.into_iter().map(Value::from).collect()),
        DuckValue::List(items) => Value::Array(items.into_iter().map(to_json).collect()),
        other => Value::String(format!("{:?}", other)),
    }
}
