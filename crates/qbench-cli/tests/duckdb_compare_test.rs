//! Integration test: compare a denormalized and a normalized DuckDB database
//! through the configuration-driven service.

use qbench_backend::{BackendId, QueryService};
use qbench_backend_duckdb::DuckDbQueryService;
use qbench_cli::{build_service, Config};
use qbench_compare::{ComparisonError, Orchestrator, RunStatus};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Seed both databases with the same three flights.
async fn seed_databases(project_dir: &Path) -> anyhow::Result<()> {
    let warehouse = DuckDbQueryService::open(&project_dir.join("data/warehouse.duckdb")).await?;
    warehouse
        .execute_batch(
            r#"
            CREATE TABLE flights AS
            SELECT * FROM (VALUES
                (1, 'ATL', 'Atlanta', 'LAX', 'Los Angeles', 12),
                (2, 'JFK', 'New York', 'SFO', 'San Francisco', 3),
                (3, 'ATL', 'Atlanta', 'ORD', 'Chicago', 40)
            ) AS t(id, origin, origin_city, dest, dest_city, dep_delay)
            "#,
        )
        .await?;

    let normalized = DuckDbQueryService::open(&project_dir.join("data/normalized.duckdb")).await?;
    normalized
        .execute_batch(
            r#"
            CREATE TABLE airports AS
            SELECT * FROM (VALUES
                ('ATL', 'Atlanta'),
                ('LAX', 'Los Angeles'),
                ('JFK', 'New York'),
                ('SFO', 'San Francisco'),
                ('ORD', 'Chicago')
            ) AS t(code, city);

            CREATE TABLE flights AS
            SELECT * FROM (VALUES
                (1, 'ATL', 'LAX', 12),
                (2, 'JFK', 'SFO', 3),
                (3, 'ATL', 'ORD', 40)
            ) AS t(id, origin, dest, dep_delay);
            "#,
        )
        .await?;

    Ok(())
}

async fn setup_project() -> anyhow::Result<(TempDir, Config)> {
    let temp_dir = TempDir::new()?;
    seed_databases(temp_dir.path()).await?;

    std::fs::write(
        temp_dir.path().join("qbench.yml"),
        r#"
name: flights
backends:
  warehouse:
    type: duckdb
    database: data/warehouse.duckdb
  normalized:
    type: duckdb
    database: data/normalized.duckdb
queries:
  - id: total_flights
    name: Total flights
    sql: SELECT COUNT(*) AS count FROM flights
"#,
    )?;

    let config = Config::load(temp_dir.path())?;
    Ok((temp_dir, config))
}

#[tokio::test]
async fn test_compare_count_across_databases() -> anyhow::Result<()> {
    let (temp_dir, config) = setup_project().await?;
    let service = build_service(&config, temp_dir.path()).await?;
    let orchestrator = Orchestrator::new(Arc::new(service));

    let sql = config.resolve_query(None, Some("total_flights"))?;
    let result = orchestrator.compare(sql).await?;

    assert_eq!(result.warehouse.data, vec![json!([3])]);
    assert_eq!(result.normalized.data, vec![json!([3])]);
    assert_eq!(result.warehouse.columns, vec!["count".to_string()]);
    assert!(result.comparison.speedup >= 0.0);

    Ok(())
}

#[tokio::test]
async fn test_schema_mismatch_is_partial_failure() -> anyhow::Result<()> {
    let (temp_dir, config) = setup_project().await?;
    let service = build_service(&config, temp_dir.path()).await?;
    let orchestrator = Orchestrator::new(Arc::new(service));

    // Only the denormalized table carries city names.
    let state = orchestrator
        .run_comparison("SELECT origin_city, COUNT(*) AS n FROM flights GROUP BY origin_city ORDER BY origin_city")
        .finish()
        .await;

    assert_eq!(state.status(), RunStatus::CompleteFailure);
    assert!(state.metrics().is_none());

    let warehouse = state.warehouse().result().expect("warehouse result kept");
    assert_eq!(warehouse.data, vec![json!(["Atlanta", 2]), json!(["New York", 1])]);

    match state.error() {
        Some(ComparisonError::PartialFailure { backend, reason }) => {
            assert_eq!(backend, BackendId::Normalized);
            assert!(reason.contains("origin_city"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_shared_database_file() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    seed_databases(temp_dir.path()).await?;

    let yaml = r#"
name: shared
backends:
  warehouse:
    type: duckdb
    database: data/warehouse.duckdb
  normalized:
    type: duckdb
    database: ./data/warehouse.duckdb
"#;
    let config: Config = serde_yaml::from_str(yaml)?;

    let service = build_service(&config, temp_dir.path()).await?;
    assert_eq!(service.kind(), "routed");

    let result = Orchestrator::new(Arc::new(service))
        .compare("SELECT MAX(dep_delay) AS max_delay FROM flights")
        .await?;
    assert_eq!(result.warehouse.data, result.normalized.data);
    assert_eq!(result.warehouse.data, vec![json!([40])]);

    Ok(())
}
