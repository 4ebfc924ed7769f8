//! Date-keyed joins between two series

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::PipelineError;
use crate::series::{NamedSeries, TimeSeriesPoint};

/// Join semantics for [`merge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Join {
    /// Keep only dates present in both series. Used when a missing day means
    /// the observation does not exist (price vs. supply).
    Inner,
    /// Keep every date of the primary series and fill a missing secondary
    /// value with zero. Used for flow series, where a day with no recorded
    /// flow means zero net flow, not unknown.
    LeftZeroFill,
}

/// One joined row: a date with a value from each contributing series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedRecord {
    pub date: NaiveDate,
    pub primary: f64,
    pub secondary: f64,
}

/// Join two series on date. Fails with [`PipelineError::MergeEmpty`] when no
/// row survives (e.g. the series share no dates under an inner join).
pub fn merge(
    primary: &NamedSeries,
    secondary: &NamedSeries,
    join: Join,
) -> Result<Vec<MergedRecord>, PipelineError> {
    let secondary_by_date: BTreeMap<NaiveDate, f64> = secondary
        .points()
        .iter()
        .map(|p| (p.date, p.value))
        .collect();

    let mut records = Vec::new();
    for point in primary.points() {
        match (secondary_by_date.get(&point.date), join) {
            (Some(&value), _) => records.push(MergedRecord {
                date: point.date,
                primary: point.value,
                secondary: value,
            }),
            (None, Join::LeftZeroFill) => records.push(MergedRecord {
                date: point.date,
                primary: point.value,
                secondary: 0.0,
            }),
            (None, Join::Inner) => {}
        }
    }

    if records.is_empty() {
        return Err(PipelineError::MergeEmpty);
    }
    Ok(records)
}

/// Extract the primary column of a merged result as a fresh series.
pub fn primary_series(records: &[MergedRecord], name: impl Into<String>) -> NamedSeries {
    let points = records
        .iter()
        .map(|r| TimeSeriesPoint {
            date: r.date,
            value: r.primary,
        })
        .collect();
    NamedSeries::from_points(name, points)
}

/// Extract the secondary column of a merged result as a fresh series.
pub fn secondary_series(records: &[MergedRecord], name: impl Into<String>) -> NamedSeries {
    let points = records
        .iter()
        .map(|r| TimeSeriesPoint {
            date: r.date,
            value: r.secondary,
        })
        .collect();
    NamedSeries::from_points(name, points)
}
