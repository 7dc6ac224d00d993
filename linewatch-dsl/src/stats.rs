//! Typed DSL statistics records.

use std::fmt;
use std::str::FromStr;

use linewatch_common::PollError;
use serde::{Deserialize, Serialize};

/// One of the two bonded physical lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Link {
    One,
    Two,
}

impl Link {
    pub const ALL: [Link; 2] = [Link::One, Link::Two];

    /// Position of this line's column pair on the status page.
    pub fn index(&self) -> usize {
        match self {
            Link::One => 0,
            Link::Two => 1,
        }
    }

    /// Label value used for the `link` metric dimension.
    pub fn label(&self) -> &'static str {
        match self {
            Link::One => "Link 1",
            Link::Two => "Link 2",
        }
    }

    /// Name of the per-line uptime gauge.
    pub fn uptime_metric(&self) -> &'static str {
        match self {
            Link::One => "link1_uptime",
            Link::Two => "link2_uptime",
        }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Traffic direction of a line stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Downstream,
    Upstream,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Downstream, Direction::Upstream];

    /// Label value used for the `direction` metric dimension.
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Downstream => "Downstream",
            Direction::Upstream => "Upstream",
        }
    }
}

/// A named stat reported for one line, split by direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStat {
    pub stat_name: String,
    pub downstream_value: f64,
    pub upstream_value: f64,
}

impl LineStat {
    pub fn new(stat_name: impl Into<String>, downstream_value: f64, upstream_value: f64) -> Self {
        Self {
            stat_name: stat_name.into(),
            downstream_value,
            upstream_value,
        }
    }

    pub fn value(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Downstream => self.downstream_value,
            Direction::Upstream => self.upstream_value,
        }
    }

    /// Sum of both directions.
    pub fn total(&self) -> f64 {
        self.downstream_value + self.upstream_value
    }
}

/// Overall WAN connectivity reported in the page banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WanStatus {
    Connected,
    Offline,
    Down,
}

impl WanStatus {
    pub const ALL: [WanStatus; 3] = [WanStatus::Connected, WanStatus::Offline, WanStatus::Down];

    pub fn as_str(&self) -> &'static str {
        match self {
            WanStatus::Connected => "Connected",
            WanStatus::Offline => "Offline",
            WanStatus::Down => "Down",
        }
    }
}

impl fmt::Display for WanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WanStatus {
    type Err = PollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WanStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| PollError::format("WAN Conn", format!("unknown WAN status {:?}", s)))
    }
}

/// Counters and uptime for a single line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkStats {
    pub hec_errors: LineStat,
    pub superframe_errors: LineStat,
    pub total_err_seconds: LineStat,
    pub sn_margin_db: LineStat,
    /// Time since the line last trained, in seconds.
    pub uptime_secs: u64,
}

/// One poll cycle's snapshot of both lines and the WAN state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DslStats {
    pub link1: LinkStats,
    pub link2: LinkStats,
    pub wan_status: WanStatus,
}

impl DslStats {
    pub fn new(link1: LinkStats, link2: LinkStats, wan_status: WanStatus) -> Self {
        Self {
            link1,
            link2,
            wan_status,
        }
    }

    pub fn link(&self, link: Link) -> &LinkStats {
        match link {
            Link::One => &self.link1,
            Link::Two => &self.link2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_stat_total() {
        let cases = [
            (0.0, 0.0),
            (1.0, 2.0),
            (9.6, 6.2),
            (-3.5, 3.5),
            (1e9, 0.25),
        ];

        for (down, up) in cases {
            let stat = LineStat::new("SN Margin (dB)", down, up);
            assert_eq!(stat.total(), down + up);
        }
    }

    #[test]
    fn test_line_stat_value_by_direction() {
        let stat = LineStat::new("HEC Errors", 12.0, 3.0);

        assert_eq!(stat.value(Direction::Downstream), 12.0);
        assert_eq!(stat.value(Direction::Upstream), 3.0);
    }

    #[test]
    fn test_wan_status_parse() {
        assert_eq!("Connected".parse::<WanStatus>().unwrap(), WanStatus::Connected);
        assert_eq!("Offline".parse::<WanStatus>().unwrap(), WanStatus::Offline);
        assert_eq!("Down".parse::<WanStatus>().unwrap(), WanStatus::Down);

        let err = "Training".parse::<WanStatus>().unwrap_err();
        assert!(matches!(err, PollError::Format { .. }));
    }

    #[test]
    fn test_link_labels() {
        assert_eq!(Link::One.label(), "Link 1");
        assert_eq!(Link::Two.label(), "Link 2");
        assert_eq!(Link::Two.index(), 1);
        assert_eq!(Link::One.uptime_metric(), "link1_uptime");
        assert_eq!(Direction::Upstream.label(), "Upstream");
    }
}
