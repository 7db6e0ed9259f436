use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Could not find qbench project root.\nExpected to find 'qbench.yml'.\nHint: Pass --project-dir or create a qbench.yml.")]
    ProjectRootNotFound,

    #[error("Failed to load configuration file: {path}\n{source}")]
    ConfigLoadError {
        path: PathBuf,
        source: anyhow::Error,
    },

    #[error("Unknown predefined query '{id}'. Available queries: {}", available.join(", "))]
    UnknownQuery { id: String, available: Vec<String> },

    #[error("No query given.\nHint: Pass the SQL as an argument or use --query-id")]
    MissingQuery,

    #[error("Pass either SQL or --query-id, not both")]
    AmbiguousQuery,

    #[error("Query is empty")]
    EmptyQuery,

    #[error("Failed to initialize {backend} backend ({kind}):\n  {source}")]
    BackendInitError {
        backend: String,
        kind: String,
        #[source]
        source: anyhow::Error,
    },
}
