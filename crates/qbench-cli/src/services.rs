use crate::config::{BackendConfig, Backends, Config};
use crate::errors::CliError;
use anyhow::Result;
use qbench_backend::{BackendId, QueryService, RoutedQueryService};
use qbench_backend_duckdb::DuckDbQueryService;
use qbench_backend_http::{HttpQueryService, HttpServiceConfig};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Build the query service for both backends from configuration.
///
/// Two DuckDB backends pointing at the same file share one service, since a
/// database file can only be opened once per process.
pub async fn build_service(config: &Config, project_dir: &Path) -> Result<RoutedQueryService> {
    let warehouse = build_backend(BackendId::Warehouse, &config.backends.warehouse, project_dir).await?;

    let normalized = if shares_database(&config.backends, project_dir) {
        Arc::clone(&warehouse)
    } else {
        build_backend(BackendId::Normalized, &config.backends.normalized, project_dir).await?
    };

    Ok(RoutedQueryService::new(warehouse, normalized))
}

/// Whether both backends are DuckDB on the same database file.
fn shares_database(backends: &Backends, project_dir: &Path) -> bool {
    match (&backends.warehouse, &backends.normalized) {
        (
            BackendConfig::DuckDb { database: warehouse },
            BackendConfig::DuckDb { database: normalized },
        ) => database_key(project_dir, warehouse) == database_key(project_dir, normalized),
        _ => false,
    }
}

/// Resolved location of a database file. Files that do not exist yet are
/// compared lexically.
fn database_key(project_dir: &Path, database: &Path) -> PathBuf {
    let path = project_dir.join(database);
    std::fs::canonicalize(&path).unwrap_or_else(|_| {
        path.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    })
}

async fn build_backend(
    backend: BackendId,
    config: &BackendConfig,
    project_dir: &Path,
) -> Result<Arc<dyn QueryService>> {
    info!(
        backend = %backend,
        kind = config.kind(),
        location = %config.location(project_dir),
        "Initializing backend"
    );

    let init_error = |source: anyhow::Error| CliError::BackendInitError {
        backend: backend.name().to_string(),
        kind: config.kind().to_string(),
        source,
    };

    let service: Arc<dyn QueryService> = match config {
        BackendConfig::Http { url, timeout_ms } => {
            let mut http_config = HttpServiceConfig::new(url.clone());
            if let Some(ms) = timeout_ms {
                http_config = http_config.with_timeout(Duration::from_millis(*ms));
            }
            Arc::new(HttpQueryService::new(http_config).map_err(|e| init_error(e.into()))?)
        }
        BackendConfig::DuckDb { database } => {
            let path = project_dir.join(database);
            Arc::new(
                DuckDbQueryService::open(&path)
                    .await
                    .map_err(|e| init_error(e.into()))?,
            )
        }
    };

    Ok(service)
}
