use std::io::IsTerminal as _;

use anyhow::Context as _;

/// Filter used by `serve`, which also wants per-request spans from `TraceLayer`.
pub const SERVE_FILTER: &str = "info,tower_http=debug";

/// Installs the stderr subscriber with `default_filter` unless `RUST_LOG` is set.
pub fn init(default_filter: &str) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(default_filter))
        .with_context(|| format!("build log filter: {default_filter}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}
