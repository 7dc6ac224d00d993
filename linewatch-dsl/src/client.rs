//! HTTP source for the modem's statistics page.

use std::time::Duration;

use linewatch_common::PollError;
use linewatch_exporter::{MetricSink, Source};
use tracing::debug;

use crate::assembler::parse_stats;
use crate::config::DeviceConfig;
use crate::metrics;
use crate::stats::DslStats;

/// Polls the modem's status page once per cycle.
pub struct DslSource {
    client: reqwest::Client,
    url: String,
}

impl DslSource {
    /// Build a source with the configured request deadline.
    pub fn new(device: &DeviceConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(device.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            url: device.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_page(&self) -> Result<String, PollError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        debug!(url = %self.url, bytes = body.len(), "Fetched status page");
        Ok(body)
    }
}

impl Source for DslSource {
    type Record = DslStats;

    fn name(&self) -> &str {
        "dsl"
    }

    async fn fetch(&self) -> Result<DslStats, PollError> {
        let body = self.fetch_page().await?;
        parse_stats(&body)
    }

    fn publish(&self, record: &DslStats, sink: &dyn MetricSink) {
        metrics::publish(record, sink);
    }
}
