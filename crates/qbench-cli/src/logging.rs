use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Install the global subscriber. Logs go to stderr so `--json` output on
/// stdout stays machine-readable. `RUST_LOG` overrides the default level.
pub fn init(verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };

    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
