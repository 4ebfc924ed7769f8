//! Turns raw scraped/fetched grids into typed series
//!
//! Every source goes through the same cleaning steps and the same two
//! parsers, so the asset variants cannot silently diverge in how they read
//! a number or a date.

use chrono::{DateTime, NaiveDate};
use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::series::{NamedSeries, TimeSeriesPoint};
use crate::table::RawTable;

/// Trailing summary row label some sources append below the daily rows.
const SUMMARY_SENTINEL: &str = "Total";

/// Which column holds the observation value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueColumn {
    Index(usize),
    /// The rightmost column of the grid.
    Last,
}

/// Source-specific cleaning knobs for [`normalize`].
#[derive(Debug, Clone)]
pub struct Schema {
    /// Header level to keep when the grid has multi-level column labels.
    /// `None` keeps the deepest level.
    pub header_level: Option<usize>,
    pub date_column: usize,
    pub value_column: ValueColumn,
    /// Drop the first data row when it repeats the header label (some
    /// scraped tables render the header a second time as a data row).
    pub drop_duplicate_header: bool,
}

/// Clean a raw grid into a dated series.
///
/// Rows whose date or value fails to parse are dropped, not errors; a grid
/// with zero surviving rows fails with [`PipelineError::EmptyAfterClean`].
pub fn normalize(
    raw: &RawTable,
    schema: &Schema,
    series_name: &str,
) -> Result<NamedSeries, PipelineError> {
    let header = raw.header_at(schema.header_level);
    let value_index = match schema.value_column {
        ValueColumn::Index(index) => index,
        ValueColumn::Last => raw.width().saturating_sub(1),
    };

    let mut rows: &[Vec<String>] = &raw.rows;
    if schema.drop_duplicate_header && !rows.is_empty() {
        let date_label = header
            .get(schema.date_column)
            .map(|label| label.trim().to_lowercase())
            .unwrap_or_default();
        let first_cell = rows[0]
            .get(schema.date_column)
            .map(|cell| cell.trim().to_lowercase())
            .unwrap_or_default();
        if !date_label.is_empty() && date_label == first_cell {
            debug!("dropping duplicated header row: {:?}", rows[0]);
            rows = &rows[1..];
        }
    }

    let mut points = Vec::new();
    let mut dropped = 0usize;
    for row in rows {
        let value_cell = row.get(value_index).map(String::as_str).unwrap_or("");
        if value_cell.trim() == SUMMARY_SENTINEL {
            continue;
        }
        let date_cell = row.get(schema.date_column).map(String::as_str).unwrap_or("");
        match (parse_date(date_cell), parse_value(value_cell)) {
            (Some(date), Some(value)) => points.push(TimeSeriesPoint { date, value }),
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(
            "series '{}': dropped {} row(s) with unparseable dates or values",
            series_name, dropped
        );
    }
    if points.is_empty() {
        return Err(PipelineError::EmptyAfterClean {
            series: series_name.to_string(),
        });
    }
    Ok(NamedSeries::from_points(series_name, points))
}

/// Shared numeric parser for table cells.
///
/// Accepts thousands separators, an optional leading currency or sign
/// marker, and accounting-style wrapped negatives: `(1.23)` parses as
/// `-1.23`, with the minus inserted only for values written in that form.
/// Anything unparseable is `None`.
pub fn parse_value(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (wrapped, inner) = match trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(inner) => (true, inner.trim()),
        None => (false, trimmed),
    };

    let mut rest = inner;
    for marker in ["US$", "$", "+"] {
        if let Some(stripped) = rest.strip_prefix(marker) {
            rest = stripped.trim_start();
            break;
        }
    }

    let cleaned: String = rest.chars().filter(|c| *c != ',').collect();
    let value: f64 = cleaned.parse().ok()?;
    Some(if wrapped { -value } else { value })
}

/// Best-effort calendar date parser shared by every source.
///
/// Handles RFC 3339 timestamps (metrics APIs) and the plain formats seen in
/// scraped tables. The calendar date is taken as-is; no timezone shifting.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(timestamp.date_naive());
    }
    const FORMATS: &[&str] = &["%Y-%m-%d", "%d %b %Y", "%d %B %Y", "%m/%d/%Y"];
    FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow_schema() -> Schema {
        Schema {
            header_level: None,
            date_column: 0,
            value_column: ValueColumn::Last,
            drop_duplicate_header: true,
        }
    }

    fn grid(cells: &[&[&str]]) -> Vec<Vec<String>> {
        cells
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_parse_value_handles_wrapped_negatives_and_separators() {
        assert_eq!(parse_value("(1.5)"), Some(-1.5));
        assert_eq!(parse_value("2,300"), Some(2300.0));
        assert_eq!(parse_value("(12,345.6)"), Some(-12345.6));
        assert_eq!(parse_value("-45.3"), Some(-45.3));
        assert_eq!(parse_value("+45.3"), Some(45.3));
        assert_eq!(parse_value("$1,234.56"), Some(1234.56));
        assert_eq!(parse_value("US$ 98.1"), Some(98.1));
        assert_eq!(parse_value("0.0"), Some(0.0));
    }

    #[test]
    fn test_parse_value_rejects_non_numeric_text() {
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("-"), None);
        assert_eq!(parse_value("Total"), None);
        assert_eq!(parse_value("n/a"), None);
        assert_eq!(parse_value("(abc)"), None);
    }

    #[test]
    fn test_parse_date_accepts_common_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 11);
        assert_eq!(parse_date("2024-01-11"), expected);
        assert_eq!(parse_date("11 Jan 2024"), expected);
        assert_eq!(parse_date("11 January 2024"), expected);
        assert_eq!(parse_date("01/11/2024"), expected);
        assert_eq!(parse_date("2024-01-11T00:00:00.000000000Z"), expected);
        assert_eq!(parse_date("Total"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_normalize_drops_summary_row_and_parses_values() {
        let raw = RawTable::new(
            grid(&[&["Date", "Total"]]),
            grid(&[
                &["11 Jan 2024", "(1.5)"],
                &["12 Jan 2024", "2,300"],
                &["Total", "Total"],
            ]),
        );

        let series = normalize(&raw, &flow_schema(), "Total").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].value, -1.5);
        assert_eq!(series.points()[1].value, 2300.0);
    }

    #[test]
    fn test_normalize_drops_duplicated_header_row() {
        let raw = RawTable::new(
            grid(&[&["Date", "Total"]]),
            grid(&[&["Date", "Total"], &["11 Jan 2024", "7.0"]]),
        );
        let series = normalize(&raw, &flow_schema(), "Total").unwrap();
        assert_eq!(series.len(), 1);

        // a first row that is real data survives
        let raw = RawTable::new(
            grid(&[&["Date", "Total"]]),
            grid(&[&["11 Jan 2024", "7.0"], &["12 Jan 2024", "8.0"]]),
        );
        let series = normalize(&raw, &flow_schema(), "Total").unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_normalize_collapses_multi_level_headers() {
        // field x ticker labels, as returned by the price history source
        let raw = RawTable::new(
            grid(&[&["Date", "Close"], &["", "BTC-USD"]]),
            grid(&[&["2024-01-11", "46630.2"]]),
        );
        let schema = Schema {
            header_level: Some(0),
            date_column: 0,
            value_column: ValueColumn::Last,
            drop_duplicate_header: false,
        };
        let series = normalize(&raw, &schema, "Price").unwrap();
        assert_eq!(series.points()[0].value, 46630.2);
    }

    #[test]
    fn test_normalize_fails_when_nothing_survives() {
        let raw = RawTable::new(
            grid(&[&["Date", "Total"]]),
            grid(&[&["not a date", "n/a"], &["Total", "Total"]]),
        );
        let err = normalize(&raw, &flow_schema(), "Total").unwrap_err();
        assert!(matches!(err, PipelineError::EmptyAfterClean { .. }));
    }

    #[test]
    fn test_normalize_sorts_rows_ascending() {
        let raw = RawTable::new(
            grid(&[&["Date", "Total"]]),
            grid(&[&["13 Jan 2024", "3.0"], &["11 Jan 2024", "1.0"]]),
        );
        let series = normalize(&raw, &flow_schema(), "Total").unwrap();
        assert_eq!(
            series.first_date(),
            NaiveDate::from_ymd_opt(2024, 1, 11)
        );
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let raw = RawTable::new(
            grid(&[&["Date", "Total"]]),
            grid(&[
                &["Date", "Total"],
                &["12 Jan 2024", "(2.5)"],
                &["11 Jan 2024", "1,000"],
                &["Total", "Total"],
            ]),
        );
        let first = normalize(&raw, &flow_schema(), "Total").unwrap();
        let second = normalize(&raw, &flow_schema(), "Total").unwrap();
        assert_eq!(first, second);
    }
}
