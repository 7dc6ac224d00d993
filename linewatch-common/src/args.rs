//! CLI argument parsing shared by the pollers.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, CommandFactory, FromArgMatches, Parser};

/// Common CLI arguments for all pollers.
///
/// Flatten this into a poller's own argument struct and parse it with
/// [`parse_with_interval`] so each poller can pick its own default interval.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PollerArgs {
    /// Run a Prometheus endpoint.
    #[arg(long)]
    pub serve: bool,

    /// Run a single fetch cycle, print the result and exit.
    #[arg(long)]
    pub oneshot: bool,

    /// Interval in seconds at which to poll the endpoint.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Port on which to run the Prometheus endpoint (overrides config).
    #[arg(long)]
    pub port: Option<u16>,

    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl PollerArgs {
    /// The poll period as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}

/// Parse process arguments, giving `--interval` the poller's default.
///
/// Exits the process with clap's usage message on invalid input.
pub fn parse_with_interval<A: Parser>(default_interval: &'static str) -> A {
    try_parse_from_with_interval(default_interval, std::env::args_os()).unwrap_or_else(|e| e.exit())
}

/// Parse the given arguments, giving `--interval` the poller's default.
pub fn try_parse_from_with_interval<A, I, T>(
    default_interval: &'static str,
    args: I,
) -> Result<A, clap::Error>
where
    A: Parser,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = <A as CommandFactory>::command()
        .mut_arg("interval", |arg| {
            arg.default_value(default_interval).required(false)
        })
        .try_get_matches_from(args)?;

    <A as FromArgMatches>::from_arg_matches(&matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser, Debug)]
    #[command(name = "test-poller")]
    struct TestArgs {
        #[command(flatten)]
        poller: PollerArgs,
    }

    #[test]
    fn test_default_interval() {
        let args: TestArgs = try_parse_from_with_interval("5", ["test-poller"]).unwrap();

        assert_eq!(args.poller.interval, 5);
        assert_eq!(args.poller.interval(), Duration::from_secs(5));
        assert!(!args.poller.serve);
        assert!(!args.poller.oneshot);
        assert_eq!(args.poller.port, None);
        assert_eq!(args.poller.config, None);
    }

    #[test]
    fn test_explicit_flags() {
        let args: TestArgs = try_parse_from_with_interval(
            "600",
            [
                "test-poller",
                "--serve",
                "--interval",
                "30",
                "--port",
                "9100",
                "--config",
                "poller.json5",
                "--log-level",
                "debug",
            ],
        )
        .unwrap();

        assert!(args.poller.serve);
        assert_eq!(args.poller.interval, 30);
        assert_eq!(args.poller.port, Some(9100));
        assert_eq!(args.poller.config, Some(PathBuf::from("poller.json5")));
        assert_eq!(args.poller.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result: Result<TestArgs, _> =
            try_parse_from_with_interval("5", ["test-poller", "--interval", "0"]);
        assert!(result.is_err());
    }
}
