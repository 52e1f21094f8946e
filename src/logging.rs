//! Logging Configuration
//!
//! Structured logging on stderr. Stdout carries the MCP protocol stream, so
//! nothing else may ever be written there.
//!
//! The level comes from `RUST_LOG` when set, otherwise from the configured
//! level (`--verbose` forces `debug`).

use crate::config::LoggingConfig;
use anyhow::Result;
use std::str::FromStr;
use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Single-line human-readable output
    #[default]
    Compact,
    /// Multi-line human-readable output
    Pretty,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

/// Filter honoring `RUST_LOG`, falling back to `level`
pub fn filter(level: &str, verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { level };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_lowercase()))
}

/// Formatting layer for `format` writing through `writer`
pub fn layer<S, W>(format: LogFormat, writer: W) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let base = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_ansi(false);

    match format {
        LogFormat::Compact => base.compact().boxed(),
        LogFormat::Pretty => base.pretty().boxed(),
        LogFormat::Json => base.json().boxed(),
    }
}

/// Install the global subscriber writing to stderr
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let format: LogFormat = config.format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    tracing_subscriber::registry()
        .with(filter(&config.level, verbose))
        .with(layer(format, std::io::stderr))
        .try_init()?;

    tracing::debug!(level = %config.level, format = ?format, "Logging initialized");
    Ok(())
}
