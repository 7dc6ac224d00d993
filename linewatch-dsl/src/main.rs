//! Prometheus exporter for DSL modem line statistics.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use linewatch_common::{PollerArgs, PollerConfig};
use linewatch_dsl::{DslPollerConfig, DslSource, metrics};
use linewatch_exporter::{MetricRegistryBuilder, RunOptions, run_poller};
use tracing::info;

/// Monitor a bonded DSL line.
#[derive(Parser, Debug)]
#[command(name = "linewatch-dsl")]
#[command(about = "Polls a DSL modem's statistics page and exports Prometheus metrics")]
#[command(version)]
struct Args {
    #[command(flatten)]
    poller: PollerArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Args = linewatch_common::parse_with_interval("5");

    let mut config = DslPollerConfig::load_or_default(args.poller.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(level) = &args.poller.log_level {
        config.logging.level = level.clone();
    }

    linewatch_common::init_tracing(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to init tracing: {}", e))?;

    info!("Starting linewatch-dsl v{}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &args.poller.config {
        info!("Loaded configuration from {:?}", path);
    }

    let options = RunOptions::from_args(&args.poller, &config.prometheus)
        .context("Invalid metrics endpoint configuration")?;

    let registry = Arc::new(
        metrics::register(MetricRegistryBuilder::new(
            config.prometheus.prefix.as_deref(),
        ))
        .build(),
    );

    let source = DslSource::new(&config.device).context("Failed to build HTTP client")?;
    info!(url = %source.url(), interval_secs = options.interval.as_secs(), "Polling modem");

    run_poller(source, registry, options).await
}
