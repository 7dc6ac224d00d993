//! Lookup tables extracted from the modem's DSL statistics page.
//!
//! The page carries no semantic markup, so rows are told apart by shape:
//!
//! - The first `<table>` is the banner. Each cell holds a label span and a
//!   value span (`WAN Conn:` / `Connected`).
//! - The second `<table>` mixes two sections. Rows with 3 cells are line
//!   descriptions (label, line 1, line 2). Rows with 5 cells are per-direction
//!   stats (label, line 1 down/up, line 2 down/up); the first of these is the
//!   column header.
//!
//! Labels are matched exactly after surrounding whitespace and trailing
//! colons are removed.

use std::collections::HashMap;
use std::sync::LazyLock;

use linewatch_common::PollError;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

use crate::stats::{LineStat, Link};

static TABLE: LazyLock<Selector> = LazyLock::new(|| selector("table"));
static ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static CELL: LazyLock<Selector> = LazyLock::new(|| selector("td"));
static SPAN: LazyLock<Selector> = LazyLock::new(|| selector("span"));

/// The one stat row whose values are not numbers.
const TRELLIS_CODING: &str = "Trellis Coding";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid CSS")
}

/// Label-keyed views of the status page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsTable {
    banner: HashMap<String, String>,
    line_info: HashMap<String, [String; 2]>,
    line_stats: HashMap<String, [LineStat; 2]>,
}

impl StatsTable {
    /// Parse a status page.
    ///
    /// Fails with [`PollError::Structural`] if the page has fewer than two
    /// tables, and [`PollError::ValueParse`] if a stat row holds a
    /// non-numeric value.
    pub fn parse(html: &str) -> Result<Self, PollError> {
        let document = Html::parse_document(html);
        let mut tables = document.select(&TABLE);

        let (Some(banner), Some(lines)) = (tables.next(), tables.next()) else {
            return Err(PollError::structural(
                "expected a banner table and a line statistics table",
            ));
        };

        Ok(Self {
            banner: parse_banner(banner),
            line_info: parse_line_info(lines),
            line_stats: parse_line_stats(lines)?,
        })
    }

    /// Banner value by label, e.g. `"WAN Conn"`.
    pub fn banner_stat(&self, name: &str) -> Option<&str> {
        self.banner.get(name).map(String::as_str)
    }

    /// Both lines' description values by label, e.g. `"Uptime"`.
    pub fn line_desc(&self, name: &str) -> Option<&[String; 2]> {
        self.line_info.get(name)
    }

    pub fn line_desc_at(&self, name: &str, link: Link) -> Option<&str> {
        self.line_desc(name).map(|values| values[link.index()].as_str())
    }

    /// Both lines' stats by label, e.g. `"HEC Errors"`.
    pub fn line_stat(&self, name: &str) -> Option<&[LineStat; 2]> {
        self.line_stats.get(name)
    }

    pub fn line_stat_at(&self, name: &str, link: Link) -> Option<&LineStat> {
        self.line_stat(name).map(|stats| &stats[link.index()])
    }

    pub fn banner(&self) -> &HashMap<String, String> {
        &self.banner
    }

    pub fn line_info(&self) -> &HashMap<String, [String; 2]> {
        &self.line_info
    }

    pub fn line_stats(&self) -> &HashMap<String, [LineStat; 2]> {
        &self.line_stats
    }
}

/// Text content with whitespace and trailing colons removed.
fn clean_text(element: ElementRef<'_>) -> String {
    let text: String = element.text().collect();
    text.trim().trim_end_matches(':').trim_end().to_string()
}

fn cells(row: ElementRef<'_>) -> Vec<String> {
    row.select(&CELL).map(clean_text).collect()
}

fn parse_banner(table: ElementRef<'_>) -> HashMap<String, String> {
    let mut banner = HashMap::new();

    for cell in table.select(&CELL) {
        let spans: Vec<String> = cell.select(&SPAN).map(clean_text).collect();
        match <[String; 2]>::try_from(spans) {
            Ok([label, value]) => {
                banner.insert(label, value);
            }
            Err(spans) => {
                debug!(spans = spans.len(), "Skipping banner cell without a label/value pair");
            }
        }
    }

    banner
}

fn parse_line_info(table: ElementRef<'_>) -> HashMap<String, [String; 2]> {
    table
        .select(&ROW)
        .map(cells)
        .filter_map(|row| <[String; 3]>::try_from(row).ok())
        .map(|[label, line1, line2]| (label, [line1, line2]))
        .collect()
}

fn parse_line_stats(table: ElementRef<'_>) -> Result<HashMap<String, [LineStat; 2]>, PollError> {
    let mut stats = HashMap::new();

    let rows = table
        .select(&ROW)
        .map(cells)
        .filter_map(|row| <[String; 5]>::try_from(row).ok())
        .skip(1);

    for [label, l1_down, l1_up, l2_down, l2_up] in rows {
        if label == TRELLIS_CODING {
            trace!(stat = %label, "Skipping non-numeric stat row");
            continue;
        }

        let line1 = LineStat::new(
            label.as_str(),
            parse_value(&label, &l1_down)?,
            parse_value(&label, &l1_up)?,
        );
        let line2 = LineStat::new(
            label.as_str(),
            parse_value(&label, &l2_down)?,
            parse_value(&label, &l2_up)?,
        );
        stats.insert(label, [line1, line2]);
    }

    Ok(stats)
}

fn parse_value(stat: &str, value: &str) -> Result<f64, PollError> {
    value.parse().map_err(|_| PollError::ValueParse {
        stat: stat.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(banner_cells: &str, line_rows: &str) -> String {
        format!(
            "<html><body><table>{}</table><table>{}</table></body></html>",
            banner_cells, line_rows
        )
    }

    const STATS_HEADER: &str =
        "<tr><td></td><td>L1 Down</td><td>L1 Up</td><td>L2 Down</td><td>L2 Up</td></tr>";

    #[test]
    fn test_requires_two_tables() {
        for html in [
            "",
            "<html><body><p>503 Service Unavailable</p></body></html>",
            "<table><tr><td><span>WAN Conn:</span><span>Down</span></td></tr></table>",
        ] {
            assert!(matches!(
                StatsTable::parse(html),
                Err(PollError::Structural(_))
            ));
        }
    }

    #[test]
    fn test_banner_labels_strip_colon() {
        let html = page(
            "<tr><td><span>WAN Conn:</span><span>Offline</span></td>\
             <td><span> Model: </span><span> NVG443B </span></td></tr>",
            "",
        );

        let table = StatsTable::parse(&html).unwrap();
        assert_eq!(table.banner_stat("WAN Conn"), Some("Offline"));
        assert_eq!(table.banner_stat("Model"), Some("NVG443B"));
        assert_eq!(table.banner_stat("WAN Conn:"), None);
    }

    #[test]
    fn test_banner_cell_with_wrong_span_count_is_skipped() {
        let html = page(
            "<tr><td><span>WAN Conn:</span><span>Down</span></td>\
             <td><span>Extra:</span><span>a</span><span>b</span></td>\
             <td>bare text</td></tr>",
            "",
        );

        let table = StatsTable::parse(&html).unwrap();
        assert_eq!(table.banner().len(), 1);
        assert_eq!(table.banner_stat("WAN Conn"), Some("Down"));
    }

    #[test]
    fn test_line_info_uses_three_cell_rows() {
        let html = page(
            "",
            "<tr><td>Mode:</td><td>VDSL2</td><td>ADSL2+</td></tr>\
             <tr><td>Too</td><td>few</td></tr>\
             <tr><td>Uptime:</td><td>00:01:00:00</td><td>00:00:30:00</td></tr>",
        );

        let table = StatsTable::parse(&html).unwrap();
        assert_eq!(table.line_info().len(), 2);
        assert_eq!(table.line_desc_at("Mode", Link::One), Some("VDSL2"));
        assert_eq!(table.line_desc_at("Mode", Link::Two), Some("ADSL2+"));
        assert_eq!(table.line_desc_at("Too", Link::One), None);
    }

    #[test]
    fn test_first_five_cell_row_is_header() {
        let html = page(
            "",
            &format!(
                "{}<tr><td>HEC Errors</td><td>1</td><td>2</td><td>3</td><td>4.5</td></tr>",
                STATS_HEADER
            ),
        );

        let table = StatsTable::parse(&html).unwrap();
        assert_eq!(table.line_stats().len(), 1);

        let [line1, line2] = table.line_stat("HEC Errors").unwrap();
        assert_eq!(*line1, LineStat::new("HEC Errors", 1.0, 2.0));
        assert_eq!(*line2, LineStat::new("HEC Errors", 3.0, 4.5));
    }

    #[test]
    fn test_trellis_coding_is_skipped() {
        let html = page(
            "",
            &format!(
                "{}<tr><td>Trellis Coding</td><td>On</td><td>On</td><td>Off</td><td>On</td></tr>\
                 <tr><td>Total ES</td><td>0</td><td>0</td><td>0</td><td>0</td></tr>",
                STATS_HEADER
            ),
        );

        let table = StatsTable::parse(&html).unwrap();
        assert!(table.line_stat("Trellis Coding").is_none());
        assert!(table.line_stat("Total ES").is_some());
    }

    #[test]
    fn test_non_numeric_stat_fails() {
        let html = page(
            "",
            &format!(
                "{}<tr><td>Total ES</td><td>0</td><td>n/a</td><td>0</td><td>0</td></tr>",
                STATS_HEADER
            ),
        );

        match StatsTable::parse(&html) {
            Err(PollError::ValueParse { stat, value }) => {
                assert_eq!(stat, "Total ES");
                assert_eq!(value, "n/a");
            }
            other => panic!("expected ValueParse, got {:?}", other),
        }
    }
}
