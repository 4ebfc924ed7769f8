//! Canonical time-series types shared by every pipeline stage
//!
//! A [`NamedSeries`] is the typed form every raw source is cleaned into:
//! ascending calendar dates, no duplicates, one numeric value per date.

pub mod derive;
pub mod merge;

pub use derive::{cumulative_sum, ema};
pub use merge::{merge, Join, MergedRecord};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

/// One observation on a calendar date (no time-of-day).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A named, ascending, uniquely-dated sequence of observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSeries {
    name: String,
    points: Vec<TimeSeriesPoint>,
}

impl NamedSeries {
    /// Build a series from unordered points. Points are sorted ascending by
    /// date; when a date repeats, the first occurrence wins and the rest are
    /// dropped with a warning.
    pub fn from_points(name: impl Into<String>, mut points: Vec<TimeSeriesPoint>) -> Self {
        let name = name.into();
        points.sort_by_key(|p| p.date);
        let before = points.len();
        points.dedup_by_key(|p| p.date);
        if points.len() < before {
            warn!(
                "series '{}': dropped {} duplicate date(s)",
                name,
                before - points.len()
            );
        }
        Self { name, points }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }
}

#[cfg(test)]
pub(crate) fn test_series(name: &str, values: &[(i32, u32, u32, f64)]) -> NamedSeries {
    let points = values
        .iter()
        .map(|&(y, m, d, value)| TimeSeriesPoint {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            value,
        })
        .collect();
    NamedSeries::from_points(name, points)
}
