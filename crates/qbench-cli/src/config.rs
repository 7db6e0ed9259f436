use crate::errors::CliError;
use anyhow::Result;
use qbench_backend::BackendId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "qbench.yml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub name: String,
    pub backends: Backends,
    /// Per-backend watchdog applied by the orchestrator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Predefined query catalog.
    #[serde(default)]
    pub queries: Vec<PredefinedQuery>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Backends {
    pub warehouse: BackendConfig,
    pub normalized: BackendConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Remote query API.
    Http {
        #[serde(default = "default_url")]
        url: String,
        /// Client-side request timeout.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
    },
    /// Local DuckDB database file, relative to the project directory.
    DuckDb { database: PathBuf },
}

fn default_url() -> String {
    qbench_backend_http::DEFAULT_BASE_URL.to_string()
}

impl BackendConfig {
    /// Get the transport name for display.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendConfig::Http { .. } => "http",
            BackendConfig::DuckDb { .. } => "duckdb",
        }
    }

    /// Where the backend lives, for display.
    pub fn location(&self, project_dir: &Path) -> String {
        match self {
            BackendConfig::Http { url, .. } => url.clone(),
            BackendConfig::DuckDb { database } => project_dir.join(database).display().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PredefinedQuery {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub sql: String,
}

impl Config {
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        let content =
            std::fs::read_to_string(&config_path).map_err(|e| CliError::ConfigLoadError {
                path: config_path.clone(),
                source: e.into(),
            })?;

        serde_yaml::from_str(&content).map_err(|e| {
            CliError::ConfigLoadError {
                path: config_path,
                source: e.into(),
            }
            .into()
        })
    }

    pub fn backend(&self, backend: BackendId) -> &BackendConfig {
        match backend {
            BackendId::Warehouse => &self.backends.warehouse,
            BackendId::Normalized => &self.backends.normalized,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Look up a predefined query by id.
    pub fn query(&self, id: &str) -> Result<&PredefinedQuery, CliError> {
        self.queries
            .iter()
            .find(|q| q.id == id)
            .ok_or_else(|| CliError::UnknownQuery {
                id: id.to_string(),
                available: self.queries.iter().map(|q| q.id.clone()).collect(),
            })
    }

    /// Resolve the SQL to run from either an inline query or a catalog id.
    pub fn resolve_query(&self, sql: Option<&str>, query_id: Option<&str>) -> Result<String, CliError> {
        let sql = match (sql, query_id) {
            (Some(_), Some(_)) => return Err(CliError::AmbiguousQuery),
            (None, None) => return Err(CliError::MissingQuery),
            (Some(sql), None) => sql.to_string(),
            (None, Some(id)) => self.query(id)?.sql.clone(),
        };

        if sql.trim().is_empty() {
            return Err(CliError::EmptyQuery);
        }

        Ok(sql)
    }
}

/// Find the qbench project root by looking for qbench.yml
pub fn find_project_root(start_dir: &Path) -> Result<PathBuf> {
    let mut current = start_dir.to_path_buf();

    // Walk up max 5 levels
    for _ in 0..5 {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }

        if let Some(parent) = current.parent() {
            current = parent.to_path_buf();
        } else {
            break;
        }
    }

    Err(CliError::ProjectRootNotFound.into())
}
