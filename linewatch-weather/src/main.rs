//! Prometheus exporter for current weather conditions.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use linewatch_common::{PollerArgs, PollerConfig};
use linewatch_exporter::{MetricRegistryBuilder, RunOptions, run_poller};
use linewatch_weather::{WeatherPollerConfig, WeatherSource, metrics};
use tracing::info;

/// Monitor outdoor conditions.
#[derive(Parser, Debug)]
#[command(name = "linewatch-weather")]
#[command(about = "Polls the Pirate Weather API and exports Prometheus metrics")]
#[command(version)]
struct Args {
    #[command(flatten)]
    poller: PollerArgs,

    /// Pirate Weather API key.
    #[arg(long, env = "PIRATE_WEATHER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Location to report on, as "lat,long".
    #[arg(long, env = "LAT_LONG")]
    lat_long: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // The free API tier allows roughly one call every ten minutes
    let args: Args = linewatch_common::parse_with_interval("600");

    let mut config = WeatherPollerConfig::load_or_default(args.poller.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(level) = &args.poller.log_level {
        config.logging.level = level.clone();
    }
    config
        .weather
        .apply_overrides(args.api_key.clone(), args.lat_long.clone());
    config.validate().context("Invalid configuration")?;

    linewatch_common::init_tracing(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to init tracing: {}", e))?;

    info!("Starting linewatch-weather v{}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &args.poller.config {
        info!("Loaded configuration from {:?}", path);
    }

    let url = config.weather.forecast_url()?;
    let options = RunOptions::from_args(&args.poller, &config.prometheus)
        .context("Invalid metrics endpoint configuration")?;

    let registry = Arc::new(
        metrics::register(MetricRegistryBuilder::new(
            config.prometheus.prefix.as_deref(),
        ))
        .build(),
    );

    let source =
        WeatherSource::new(url, &config.weather).context("Failed to build HTTP client")?;
    info!(
        location = config.weather.lat_long.as_deref().unwrap_or_default(),
        interval_secs = options.interval.as_secs(),
        "Polling forecast API"
    );

    run_poller(source, registry, options).await
}
