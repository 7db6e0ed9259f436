use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use qbench_backend::{BackendId, QueryService};
use qbench_cli::render::{render_catalog, render_comparison, render_failure, render_query_result};
use qbench_cli::{build_service, find_project_root, logging, Config, ConsoleSink};
use qbench_compare::Orchestrator;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "qbench")]
#[command(
    about = "Run one query against the warehouse and normalized databases side by side",
    long_about = None
)]
struct Cli {
    /// Path to qbench project root
    #[arg(long, global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a query on both backends and compare their timings
    Compare(QueryArgs),
    /// Run a query on a single backend
    Run(RunArgs),
    /// List the predefined queries from qbench.yml
    Queries,
}

#[derive(Args)]
struct QueryArgs {
    /// SQL to execute
    sql: Option<String>,

    /// Execute a predefined query from qbench.yml instead
    #[arg(long)]
    query_id: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Number of result rows to preview per backend
    #[arg(long, default_value_t = 10)]
    preview: usize,

    /// Fail a backend that has not answered within this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[derive(Args)]
struct RunArgs {
    /// Backend to run against (warehouse or normalized)
    #[arg(long)]
    backend: BackendId,

    #[command(flatten)]
    query: QueryArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let project_dir = find_project_root(&cli.project_dir)
        .with_context(|| format!("Failed to find project root from {:?}", cli.project_dir))?;

    let config =
        Config::load(&project_dir).with_context(|| "Failed to load qbench.yml configuration")?;

    match cli.command {
        Commands::Compare(args) => compare(&config, &project_dir, args).await,
        Commands::Run(args) => run(&config, &project_dir, args).await,
        Commands::Queries => {
            print!("{}", render_catalog(&config.queries));
            Ok(())
        }
    }
}

async fn build_orchestrator(
    config: &Config,
    project_dir: &Path,
    timeout_ms: Option<u64>,
) -> Result<Orchestrator> {
    let service = build_service(config, project_dir)
        .await
        .with_context(|| "Failed to initialize backends")?;

    let mut orchestrator =
        Orchestrator::new(Arc::new(service) as Arc<dyn QueryService>).with_sink(Arc::new(ConsoleSink));

    if let Some(timeout) = timeout_ms.map(Duration::from_millis).or_else(|| config.timeout()) {
        orchestrator = orchestrator.with_timeout(timeout);
    }

    Ok(orchestrator)
}

async fn compare(config: &Config, project_dir: &Path, args: QueryArgs) -> Result<()> {
    let sql = config.resolve_query(args.sql.as_deref(), args.query_id.as_deref())?;
    let orchestrator = build_orchestrator(config, project_dir, args.timeout_ms).await?;

    if !args.json {
        println!("Project: {}", config.name);
        for backend in BackendId::ALL {
            let backend_config = config.backend(backend);
            println!(
                "{}: {} ({})",
                backend.name(),
                backend_config.location(project_dir),
                backend_config.kind()
            );
        }
        println!("\n{}\n", sql.trim());
    }

    let state = orchestrator.run_comparison(sql).finish().await;

    match state.clone().into_result() {
        Ok(result) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("\n{}", render_comparison(&result, args.preview));
            }
            Ok(())
        }
        Err(err) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                println!("\n{}", render_failure(&state, args.preview));
            }
            Err(err.into())
        }
    }
}

async fn run(config: &Config, project_dir: &Path, args: RunArgs) -> Result<()> {
    let query = args.query;
    let sql = config.resolve_query(query.sql.as_deref(), query.query_id.as_deref())?;
    let orchestrator = build_orchestrator(config, project_dir, query.timeout_ms).await?;

    let result = orchestrator
        .execute_one(args.backend, &sql)
        .await
        .map_err(|e| anyhow::anyhow!("{} query failed: {}", args.backend.name(), e.reason()))?;

    if query.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", render_query_result(args.backend, &result, query.preview));
    }

    Ok(())
}
