//! Pure derivations over a series: running totals and smoothing
//!
//! Both functions build a fresh series and never touch their input, so
//! recomputing from the same input is deterministic.

use crate::series::{NamedSeries, TimeSeriesPoint};

/// Running total: the value at index `i` is the sum of values `0..=i`.
pub fn cumulative_sum(series: &NamedSeries, name: impl Into<String>) -> NamedSeries {
    let mut total = 0.0;
    let points = series
        .points()
        .iter()
        .map(|p| {
            total += p.value;
            TimeSeriesPoint {
                date: p.date,
                value: total,
            }
        })
        .collect();
    NamedSeries::from_points(name, points)
}

/// Exponential moving average with smoothing factor `2 / (span + 1)`.
///
/// Seeds from the first value: `ema[0] = v[0]`, then
/// `ema[i] = alpha * v[i] + (1 - alpha) * ema[i-1]`.
///
/// # Panics
///
/// Panics if `span` is zero.
pub fn ema(series: &NamedSeries, span: usize, name: impl Into<String>) -> NamedSeries {
    assert!(span >= 1, "EMA span must be at least 1");
    let alpha = 2.0 / (span as f64 + 1.0);

    let mut previous: Option<f64> = None;
    let points = series
        .points()
        .iter()
        .map(|p| {
            let value = match previous {
                None => p.value,
                Some(prior) => alpha * p.value + (1.0 - alpha) * prior,
            };
            previous = Some(value);
            TimeSeriesPoint {
                date: p.date,
                value,
            }
        })
        .collect();
    NamedSeries::from_points(name, points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::test_series;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_cumulative_sum_is_prefix_sum_at_every_index() {
        let series = test_series(
            "Total",
            &[
                (2024, 1, 1, 1.5),
                (2024, 1, 2, -0.5),
                (2024, 1, 3, 4.0),
                (2024, 1, 4, 0.0),
            ],
        );
        let cumulative = cumulative_sum(&series, "Cumulative Inflow");

        for (i, point) in cumulative.points().iter().enumerate() {
            let expected: f64 = series.points()[..=i].iter().map(|p| p.value).sum();
            assert!((point.value - expected).abs() < TOLERANCE);
        }
        assert_eq!(cumulative.points()[0].value, 1.5);
        assert_eq!(cumulative.name(), "Cumulative Inflow");
    }

    #[test]
    fn test_ema_follows_recurrence() {
        let series = test_series(
            "Price",
            &[
                (2024, 1, 1, 100.0),
                (2024, 1, 2, 110.0),
                (2024, 1, 3, 95.0),
                (2024, 1, 4, 120.0),
            ],
        );
        let span = 20;
        let alpha = 2.0 / (span as f64 + 1.0);
        let smoothed = ema(&series, span, "EMA 20-Day");

        assert_eq!(smoothed.points()[0].value, series.points()[0].value);
        for i in 1..series.len() {
            let expected =
                alpha * series.points()[i].value + (1.0 - alpha) * smoothed.points()[i - 1].value;
            assert!((smoothed.points()[i].value - expected).abs() < TOLERANCE);
        }
    }

    #[test]
    fn test_ema_span_one_tracks_the_input() {
        let series = test_series("Price", &[(2024, 1, 1, 3.0), (2024, 1, 2, 7.0)]);
        let smoothed = ema(&series, 1, "EMA 1-Day");
        for (raw, s) in series.points().iter().zip(smoothed.points()) {
            assert!((raw.value - s.value).abs() < TOLERANCE);
        }
    }

    #[test]
    fn test_derivations_on_empty_series_are_empty() {
        let series = NamedSeries::from_points("Total", Vec::new());
        assert!(cumulative_sum(&series, "c").is_empty());
        assert!(ema(&series, 20, "e").is_empty());
    }

    #[test]
    #[should_panic(expected = "span must be at least 1")]
    fn test_ema_rejects_zero_span() {
        let series = test_series("Price", &[(2024, 1, 1, 3.0)]);
        ema(&series, 0, "EMA 0-Day");
    }
}
