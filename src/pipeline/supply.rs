//! Price vs. total on-chain supply report

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::assets::AssetSpec;
use crate::chart;
use crate::error::Result;
use crate::metrics;
use crate::normalize::{self, Schema, ValueColumn};
use crate::pipeline::{self, persist, RunSummary};
use crate::series::{self, merge, Join, NamedSeries};

/// Options for one supply-report invocation.
#[derive(Debug, Clone)]
pub struct SupplyOptions {
    /// Overrides the start of both the supply and price windows.
    pub start_date: Option<NaiveDate>,
    pub out_dir: PathBuf,
}

/// Run the supply report for one asset. Branches are independent, CSVs are
/// written as soon as their series clean up, and the chart is skipped with a
/// reason when either series is missing.
pub async fn run(spec: &AssetSpec, opts: &SupplyOptions) -> RunSummary {
    let start = opts.start_date.unwrap_or(spec.supply_start);
    let mut summary = RunSummary::new(format!("{} supply report", spec.label));

    let supply_series = match fetch_supply_series(spec, start).await {
        Ok(series) => Some(series),
        Err(err) => {
            summary.failure("supply metrics", &err);
            None
        }
    };
    if let Some(series) = &supply_series {
        persist(&mut summary, &opts.out_dir.join(spec.supply_csv), series, "supply series");
    }

    let price_series = match pipeline::price_series(spec.ticker, start).await {
        Ok(series) => Some(series),
        Err(err) => {
            summary.failure("price history", &err);
            None
        }
    };
    if let Some(series) = &price_series {
        persist(&mut summary, &opts.out_dir.join(spec.price_csv), series, "price series");
    }

    let (Some(price), Some(supply)) = (price_series, supply_series) else {
        info!(
            "Skipping {} supply chart: a required series is unavailable",
            spec.label
        );
        return summary;
    };

    match build_chart(spec, &opts.out_dir, start, &price, &supply) {
        Ok(path) => summary.success(format!("saved chart to {}", path.display())),
        Err(err) => summary.failure("chart", &err),
    }
    summary
}

async fn fetch_supply_series(spec: &AssetSpec, start: NaiveDate) -> Result<NamedSeries> {
    let raw = metrics::fetch_supply(spec.coinmetrics_id, start).await?;
    Ok(normalize::normalize(&raw, &supply_schema(), "Supply")?)
}

/// The metrics grid is a plain two-column time x value layout.
fn supply_schema() -> Schema {
    Schema {
        header_level: None,
        date_column: 0,
        value_column: ValueColumn::Last,
        drop_duplicate_header: false,
    }
}

fn build_chart(
    spec: &AssetSpec,
    out_dir: &Path,
    start: NaiveDate,
    price: &NamedSeries,
    supply: &NamedSeries,
) -> Result<PathBuf> {
    // A date missing from either side is a missing observation, so only
    // shared dates are charted.
    let records = series::merge(price, supply, Join::Inner)?;

    let price_joined = merge::primary_series(&records, "Price (USD)");
    let supply_joined = merge::secondary_series(&records, "Total Supply");

    let path = out_dir.join(spec.supply_chart);
    chart::render_supply_chart(&price_joined, &supply_joined, spec.label, start, &path)?;
    Ok(path)
}
