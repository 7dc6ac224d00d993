//! HTTP source for the Pirate Weather forecast API.

use linewatch_common::PollError;
use linewatch_exporter::{MetricSink, Source};
use tracing::debug;

use crate::config::WeatherConfig;
use crate::metrics;
use crate::weather::{Weather, parse_forecast};

/// Fetches current conditions once per cycle.
pub struct WeatherSource {
    client: reqwest::Client,
    url: String,
}

impl WeatherSource {
    /// Build a source for a fully resolved forecast URL.
    pub fn new(url: impl Into<String>, config: &WeatherConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            url: url.into(),
        })
    }
}

impl Source for WeatherSource {
    type Record = Weather;

    fn name(&self) -> &str {
        "weather"
    }

    async fn fetch(&self) -> Result<Weather, PollError> {
        // The URL embeds the API key; keep it out of the logs
        let body = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| PollError::Transport(e.without_url()))?
            .text()
            .await
            .map_err(|e| PollError::Transport(e.without_url()))?;

        let weather = parse_forecast(&body)?;
        debug!(observed_at = ?weather.observed_at(), "Fetched current conditions");
        Ok(weather)
    }

    fn publish(&self, record: &Weather, sink: &dyn MetricSink) {
        metrics::publish(record, sink);
    }
}
