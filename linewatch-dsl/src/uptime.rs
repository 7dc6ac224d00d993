//! Line uptime strings as reported by the modem.
//!
//! The status page shows how long each line has been trained as
//! `DD:HH:MM:SS`. Components are taken verbatim; the modem is free to report
//! 25 hours or 90 minutes and those contribute their literal magnitude.

use std::fmt;
use std::str::FromStr;

use linewatch_common::PollError;
use serde::Serialize;

const FIELD: &str = "Uptime";

/// A days/hours/minutes/seconds duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Uptime {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Uptime {
    pub fn new(days: u64, hours: u64, minutes: u64, seconds: u64) -> Self {
        Self {
            days,
            hours,
            minutes,
            seconds,
        }
    }

    /// Total elapsed seconds. Saturates rather than wrapping.
    pub fn total_seconds(&self) -> u64 {
        self.days
            .saturating_mul(86_400)
            .saturating_add(self.hours.saturating_mul(3_600))
            .saturating_add(self.minutes.saturating_mul(60))
            .saturating_add(self.seconds)
    }
}

impl fmt::Display for Uptime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

impl FromStr for Uptime {
    type Err = PollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim().split(':').collect();
        if fields.len() != 4 {
            return Err(PollError::format(
                FIELD,
                format!("expected 4 colon-separated fields, got {} in {:?}", fields.len(), s),
            ));
        }

        let mut values = [0u64; 4];
        for (slot, field) in values.iter_mut().zip(&fields) {
            *slot = field.parse().map_err(|_| {
                PollError::format(FIELD, format!("non-integer component {:?} in {:?}", field, s))
            })?;
        }

        let [days, hours, minutes, seconds] = values;
        Ok(Self::new(days, hours, minutes, seconds))
    }
}

/// Parse an uptime string straight to total seconds.
pub fn parse_uptime_secs(s: &str) -> Result<u64, PollError> {
    Ok(s.parse::<Uptime>()?.total_seconds())
}
