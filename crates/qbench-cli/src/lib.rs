pub mod config;
pub mod errors;
pub mod logging;
pub mod render;
pub mod services;

pub use config::{find_project_root, BackendConfig, Backends, Config, PredefinedQuery};
pub use errors::CliError;
pub use render::ConsoleSink;
pub use services::build_service;
