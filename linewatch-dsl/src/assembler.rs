//! Projection of the page's lookup tables into a [`DslStats`] record.

use linewatch_common::PollError;

use crate::stats::{DslStats, LineStat, Link, LinkStats, WanStatus};
use crate::table::StatsTable;
use crate::uptime::parse_uptime_secs;

pub const UPTIME: &str = "Uptime";
pub const WAN_CONN: &str = "WAN Conn";
pub const HEC_ERRORS: &str = "HEC Errors";
pub const SUPER_FRAME_ERRORS: &str = "Super Frame Errors";
pub const TOTAL_ES: &str = "Total ES";
pub const SN_MARGIN: &str = "SN Margin (dB)";

/// Build a record from an already parsed page.
///
/// Every row listed above must be present; the first absent one fails the
/// whole record with [`PollError::MissingField`].
pub fn assemble(table: &StatsTable) -> Result<DslStats, PollError> {
    let wan_status: WanStatus = table
        .banner_stat(WAN_CONN)
        .ok_or_else(|| PollError::missing(WAN_CONN))?
        .parse()?;

    Ok(DslStats::new(
        link_stats(table, Link::One)?,
        link_stats(table, Link::Two)?,
        wan_status,
    ))
}

/// Parse a status page straight into a record.
pub fn parse_stats(html: &str) -> Result<DslStats, PollError> {
    assemble(&StatsTable::parse(html)?)
}

fn link_stats(table: &StatsTable, link: Link) -> Result<LinkStats, PollError> {
    let uptime = table
        .line_desc_at(UPTIME, link)
        .ok_or_else(|| PollError::missing(UPTIME))?;

    Ok(LinkStats {
        hec_errors: line_stat(table, HEC_ERRORS, link)?,
        superframe_errors: line_stat(table, SUPER_FRAME_ERRORS, link)?,
        total_err_seconds: line_stat(table, TOTAL_ES, link)?,
        sn_margin_db: line_stat(table, SN_MARGIN, link)?,
        uptime_secs: parse_uptime_secs(uptime)?,
    })
}

fn line_stat(table: &StatsTable, name: &str, link: Link) -> Result<LineStat, PollError> {
    table
        .line_stat_at(name, link)
        .cloned()
        .ok_or_else(|| PollError::missing(name))
}
