// src/logging.rs
// =============================================================================
// Sets up `tracing` output.
//
// Logs always go to stderr, so `check --json` can pipe clean JSON from
// stdout. The level comes from RUST_LOG (default: info).
//
// Examples:
//   RUST_LOG=debug link-guardian check https://example.com
//   RUST_LOG=link_guardian=debug,reqwest=info link-guardian serve
//   link-guardian --log-format json serve
// =============================================================================

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines with colors
    #[default]
    Text,
    /// One JSON object per line, for log collectors
    Json,
}

/// Installs the global subscriber. Call once, at startup.
pub fn init_logging(format: LogFormat) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter()?)
        .with_writer(std::io::stderr);

    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}

// html5ever and selectors are chatty about every malformed page
fn build_filter() -> Result<EnvFilter> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive("html5ever=warn".parse()?)
        .add_directive("selectors=warn".parse()?)
        .add_directive("hyper=warn".parse()?);

    Ok(filter)
}
