//! Configuration for the DSL poller.

use linewatch_common::{Error, LoggingConfig, PollerConfig, Result};
use linewatch_exporter::PrometheusConfig;
use serde::{Deserialize, Serialize};

/// Complete DSL poller configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DslPollerConfig {
    /// Modem to poll.
    #[serde(default)]
    pub device: DeviceConfig,

    /// Metrics endpoint settings.
    #[serde(default)]
    pub prometheus: PrometheusConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the modem's statistics page lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Status page URL.
    #[serde(default = "default_url")]
    pub url: String,

    /// Request timeout in milliseconds (default: 3000).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_url() -> String {
    "http://192.168.254.254/cgi-bin/dslstatistics.ha".to_string()
}

fn default_timeout_ms() -> u64 {
    3000
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl PollerConfig for DslPollerConfig {
    fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.device.url).map_err(|e| {
            Error::validation(format!("Invalid device URL '{}': {}", self.device.url, e))
        })?;

        if self.device.timeout_ms == 0 {
            return Err(Error::validation("device.timeout_ms must be greater than 0"));
        }

        self.prometheus.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linewatch_common::parse_config;

    #[test]
    fn test_defaults() {
        let config = DslPollerConfig::default();

        assert_eq!(
            config.device.url,
            "http://192.168.254.254/cgi-bin/dslstatistics.ha"
        );
        assert_eq!(config.device.timeout_ms, 3000);
        assert_eq!(config.prometheus.port, 8000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let config: DslPollerConfig = parse_config(
            r#"{
                // modem on a different subnet
                device: { url: "http://10.0.0.1/cgi-bin/dslstatistics.ha" },
                prometheus: { port: 9101, prefix: "dsl" },
                logging: { level: "debug", format: "json" },
            }"#,
        )
        .unwrap();

        assert_eq!(config.device.url, "http://10.0.0.1/cgi-bin/dslstatistics.ha");
        assert_eq!(config.device.timeout_ms, 3000);
        assert_eq!(config.prometheus.port, 9101);
        assert_eq!(config.prometheus.prefix.as_deref(), Some("dsl"));
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = DslPollerConfig::default();
        config.device.url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = DslPollerConfig::default();
        config.device.timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = DslPollerConfig::default();
        config.prometheus.path = "metrics".to_string();
        assert!(config.validate().is_err());
    }
}
