//! Configuration for the Prometheus endpoint.

use std::net::SocketAddr;

use linewatch_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// Prometheus HTTP endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrometheusConfig {
    /// Address to bind (default: "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on (default: 8000).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path for metrics endpoint (default: "/metrics").
    #[serde(default = "default_path")]
    pub path: String,

    /// Optional metric name prefix.
    #[serde(default)]
    pub prefix: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_path() -> String {
    "/metrics".to_string()
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            path: default_path(),
            prefix: None,
        }
    }
}

impl PrometheusConfig {
    /// The socket address the endpoint binds to.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| {
                Error::validation(format!(
                    "Invalid listen address: {}:{}",
                    self.host, self.port
                ))
            })
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;

        if !self.path.starts_with('/') {
            return Err(Error::validation("Metrics path must start with /"));
        }

        if let Some(prefix) = &self.prefix {
            let valid = !prefix.is_empty()
                && !prefix.starts_with(|c: char| c.is_ascii_digit())
                && prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                return Err(Error::validation(format!(
                    "Invalid metric prefix: {}",
                    prefix
                )));
            }
        }

        Ok(())
    }
}
