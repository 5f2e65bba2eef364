//! Stderr logging for both binaries. `RUST_LOG` overrides the default filter.

use anyhow::Context as _;

/// CLI default: progress and failures only.
pub const CLI_FILTER: &str = "info";

/// Server default: adds per-request spans and timings from the trace layer.
pub const APP_FILTER: &str = "info,tower_http=debug";

pub fn init() -> anyhow::Result<()> {
    init_with_default(CLI_FILTER)
}

pub fn init_with_default(default_filter: &str) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(default_filter))
        .with_context(|| format!("build log filter from default `{default_filter}`"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}
