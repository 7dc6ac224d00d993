//! The fixed-interval poll loop.
//!
//! ```text
//!        timer expires
//!   Idle ─────────────> Fetching
//!    ^                     │
//!    └─────────────────────┘
//!     cycle done (ok or err)
//! ```
//!
//! A cycle fetches one record from its [`Source`], publishes it to the
//! [`MetricSink`], and returns to idle. Errors skip the cycle and leave the
//! previously published values in place; there are no retries and no
//! backoff.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use linewatch_common::PollError;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::sink::MetricSink;

/// Something that can be polled for a record once per cycle.
pub trait Source: Send + Sync + 'static {
    /// The snapshot produced by one successful fetch.
    type Record: fmt::Debug + Serialize + Send + Sync;

    /// Name used in log messages.
    fn name(&self) -> &str;

    /// Fetch and parse one record.
    fn fetch(&self) -> impl Future<Output = Result<Self::Record, PollError>> + Send;

    /// Forward a record's fields into the sink.
    fn publish(&self, record: &Self::Record, sink: &dyn MetricSink);
}

/// Poll loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Waiting for the interval timer.
    Idle,
    /// A fetch-parse-publish cycle is in progress.
    Fetching,
}

/// Result of a single cycle.
#[derive(Debug)]
pub enum CycleOutcome<R> {
    /// The record was fetched and forwarded to the sink.
    Published(R),
    /// The cycle failed and nothing was published.
    Skipped(PollError),
}

impl<R> CycleOutcome<R> {
    pub fn is_published(&self) -> bool {
        matches!(self, CycleOutcome::Published(_))
    }
}

/// Drives a [`Source`] at a fixed interval.
pub struct PollLoop<S: Source> {
    source: S,
    sink: Arc<dyn MetricSink>,
    interval: Duration,
    state: PollState,
}

impl<S: Source> PollLoop<S> {
    pub fn new(source: S, sink: Arc<dyn MetricSink>, interval: Duration) -> Self {
        Self {
            source,
            sink,
            interval,
            state: PollState::Idle,
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Perform a single fetch-parse-publish cycle.
    pub async fn run_cycle(&mut self) -> CycleOutcome<S::Record> {
        self.state = PollState::Fetching;

        let outcome = match self.source.fetch().await {
            Ok(record) => {
                debug!(source = %self.source.name(), record = ?record, "Fetched record");
                self.source.publish(&record, self.sink.as_ref());
                CycleOutcome::Published(record)
            }
            Err(e) => {
                warn!(
                    source = %self.source.name(),
                    kind = %e.kind(),
                    error = %e,
                    "Poll cycle failed, skipping"
                );
                CycleOutcome::Skipped(e)
            }
        };

        self.sink.cycle_completed(outcome.is_published());
        self.state = PollState::Idle;
        outcome
    }

    /// Run cycles until the shutdown signal is received.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            source = %self.source.name(),
            interval_secs = self.interval.as_secs(),
            "Starting poll loop"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.run_cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(source = %self.source.name(), "Poll loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Serialize)]
    struct Reading {
        value: f64,
    }

    /// Fails on the cycles listed in `fail_on`, succeeds otherwise.
    struct ScriptedSource {
        calls: AtomicUsize,
        fail_on: Vec<usize>,
        stop_after: Option<(usize, watch::Sender<bool>)>,
    }

    impl ScriptedSource {
        fn new(fail_on: Vec<usize>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on,
                stop_after: None,
            }
        }
    }

    impl Source for ScriptedSource {
        type Record = Reading;

        fn name(&self) -> &str {
            "scripted"
        }

        async fn fetch(&self) -> Result<Reading, PollError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

            if let Some((limit, tx)) = &self.stop_after {
                if call >= *limit {
                    let _ = tx.send(true);
                }
            }

            if self.fail_on.contains(&call) {
                Err(PollError::structural("device unreachable"))
            } else {
                Ok(Reading {
                    value: call as f64,
                })
            }
        }

        fn publish(&self, record: &Reading, sink: &dyn MetricSink) {
            sink.set_gauge("reading", record.value);
        }
    }

    #[tokio::test]
    async fn test_successful_cycle_publishes() {
        let sink = Arc::new(MemorySink::new());
        let mut poll = PollLoop::new(
            ScriptedSource::new(vec![]),
            sink.clone(),
            Duration::from_secs(5),
        );

        let outcome = poll.run_cycle().await;

        assert!(outcome.is_published());
        assert_eq!(poll.state(), PollState::Idle);
        assert_eq!(sink.gauge("reading"), Some(1.0));
        assert_eq!(sink.cycles(), vec![true]);
    }

    #[tokio::test]
    async fn test_failed_cycle_publishes_nothing() {
        let sink = Arc::new(MemorySink::new());
        let mut poll = PollLoop::new(
            ScriptedSource::new(vec![1]),
            sink.clone(),
            Duration::from_secs(5),
        );

        let outcome = poll.run_cycle().await;

        match outcome {
            CycleOutcome::Skipped(e) => assert!(matches!(e, PollError::Structural(_))),
            CycleOutcome::Published(_) => panic!("expected a skipped cycle"),
        }
        assert_eq!(poll.state(), PollState::Idle);
        assert_eq!(sink.series_count(), 0);
        assert_eq!(sink.cycles(), vec![false]);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_values() {
        let sink = Arc::new(MemorySink::new());
        let mut poll = PollLoop::new(
            ScriptedSource::new(vec![2]),
            sink.clone(),
            Duration::from_secs(5),
        );

        poll.run_cycle().await;
        poll.run_cycle().await;

        assert_eq!(sink.gauge("reading"), Some(1.0));

        poll.run_cycle().await;
        assert_eq!(sink.gauge("reading"), Some(3.0));
        assert_eq!(sink.cycles(), vec![true, false, true]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_continues_after_failures_until_shutdown() {
        let (tx, rx) = watch::channel(false);
        let mut source = ScriptedSource::new(vec![1, 2]);
        source.stop_after = Some((4, tx));

        let sink = Arc::new(MemorySink::new());
        let poll = PollLoop::new(source, sink.clone(), Duration::from_secs(5));

        poll.run(rx).await;

        assert_eq!(sink.cycles(), vec![false, false, true, true]);
        assert_eq!(sink.gauge("reading"), Some(4.0));
    }

    #[tokio::test]
    async fn test_run_exits_immediately_when_already_shut_down() {
        let (_tx, rx) = watch::channel(true);
        let sink = Arc::new(MemorySink::new());
        let poll = PollLoop::new(
            ScriptedSource::new(vec![]),
            sink.clone(),
            Duration::from_secs(5),
        );

        poll.run(rx).await;

        assert!(sink.cycles().is_empty());
    }
}
