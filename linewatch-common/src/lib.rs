//! Linewatch Common Library
//!
//! Shared types and utilities for the linewatch pollers:
//!
//! - [`config`] - Configuration loading (JSON5 format)
//! - [`args`] - CLI arguments common to every poller
//! - [`error`] - Error types, including the per-cycle [`PollError`] taxonomy

pub mod args;
pub mod config;
pub mod error;

// Re-export commonly used types at the crate root
pub use args::{PollerArgs, parse_with_interval, try_parse_from_with_interval};
pub use config::{LogFormat, LoggingConfig, PollerConfig, load_config, parse_config};
pub use error::{Error, PollError, PollErrorKind, Result};

/// Initialize tracing with the given configuration.
///
/// `RUST_LOG` takes precedence over the configured level. Supports two
/// output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
