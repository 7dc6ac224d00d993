//! Process lifecycle for a poller binary.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use linewatch_common::PollerArgs;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::config::PrometheusConfig;
use crate::http::HttpServer;
use crate::poll::{CycleOutcome, PollLoop, Source};
use crate::registry::SharedRegistry;

/// How a poller process should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Start the metrics HTTP listener.
    pub serve: bool,
    /// Run one cycle and exit.
    pub oneshot: bool,
    /// Poll period.
    pub interval: Duration,
    /// Listener address.
    pub listen_addr: SocketAddr,
    /// Metrics endpoint path.
    pub metrics_path: String,
}

impl RunOptions {
    /// Combine CLI arguments with the endpoint configuration.
    ///
    /// `--port` overrides the configured port.
    pub fn from_args(
        args: &PollerArgs,
        prometheus: &PrometheusConfig,
    ) -> linewatch_common::Result<Self> {
        let mut prometheus = prometheus.clone();
        if let Some(port) = args.port {
            prometheus.port = port;
        }
        prometheus.validate()?;

        Ok(Self {
            serve: args.serve,
            oneshot: args.oneshot,
            interval: args.interval(),
            listen_addr: prometheus.listen_addr()?,
            metrics_path: prometheus.path,
        })
    }
}

/// Run a poller until it finishes (oneshot) or Ctrl+C/SIGTERM arrives.
///
/// Only listener bind failures are fatal; poll failures are logged and the
/// loop carries on.
pub async fn run_poller<S: Source>(
    source: S,
    registry: SharedRegistry,
    options: RunOptions,
) -> anyhow::Result<()> {
    run_poller_until(source, registry, options, wait_for_shutdown_signal()).await
}

/// Like [`run_poller`], but continuous mode stops when `shutdown` resolves.
pub async fn run_poller_until<S, F>(
    source: S,
    registry: SharedRegistry,
    options: RunOptions,
    shutdown: F,
) -> anyhow::Result<()>
where
    S: Source,
    F: Future<Output = ()>,
{
    let name = source.name().to_string();
    let mut poll = PollLoop::new(source, registry.clone(), options.interval);

    if options.oneshot {
        match poll.run_cycle().await {
            CycleOutcome::Published(record) => {
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
            CycleOutcome::Skipped(_) => {
                debug!(source = %name, "Oneshot cycle produced no record");
            }
        }
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let http_task = if options.serve {
        info!(port = options.listen_addr.port(), "Starting prometheus server");
        let server = HttpServer::new(
            registry.clone(),
            options.listen_addr,
            options.metrics_path.clone(),
        )
        .bind()
        .await?;

        let http_shutdown = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = server.serve(http_shutdown).await {
                error!("HTTP server error: {}", e);
            }
        }))
    } else {
        None
    };

    let poll_task = tokio::spawn(poll.run(shutdown_rx.clone()));

    shutdown.await;

    // Tasks that already exited have dropped their receivers
    let _ = shutdown_tx.send(true);

    // Wait for tasks to complete
    let _ = tokio::time::timeout(Duration::from_secs(5), async {
        let _ = poll_task.await;
        if let Some(http_task) = http_task {
            let _ = http_task.await;
        }
    })
    .await;

    info!(
        source = %name,
        cycles = registry.cycles(),
        failures = registry.failures(),
        "Poller stopped"
    );
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
