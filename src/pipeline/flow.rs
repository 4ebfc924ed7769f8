//! Price vs. cumulative spot-ETF inflow report

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::assets::AssetSpec;
use crate::chart;
use crate::error::Result;
use crate::normalize::{self, Schema, ValueColumn};
use crate::pipeline::{self, persist, RunSummary};
use crate::scraping::FlowScraper;
use crate::series::{self, merge, Join, NamedSeries};

const EMA_SPANS: [usize; 3] = [20, 60, 120];

/// Options for one flow-report invocation.
#[derive(Debug, Clone)]
pub struct FlowOptions {
    /// Overrides the price window start; defaults to the first flow date.
    pub start_date: Option<NaiveDate>,
    pub out_dir: PathBuf,
    /// Save the scraped page HTML here for inspection.
    pub dump_html: Option<PathBuf>,
}

/// Run the flow report for one asset.
///
/// The scrape branch and the price branch proceed independently; every
/// series that cleans up is saved as CSV before the chart decision, so a
/// single upstream failure still leaves partial output behind.
pub async fn run(spec: &AssetSpec, opts: &FlowOptions) -> RunSummary {
    let mut summary = RunSummary::new(format!("{} flow report", spec.label));

    let flow_series = match scrape_flow_series(spec, opts) {
        Ok(series) => Some(series),
        Err(err) => {
            summary.failure("ETF flow scrape", &err);
            None
        }
    };
    if let Some(series) = &flow_series {
        persist(&mut summary, &opts.out_dir.join(spec.flow_csv), series, "flow series");
    }

    let price_start = opts
        .start_date
        .or_else(|| flow_series.as_ref().and_then(NamedSeries::first_date))
        .unwrap_or(spec.flow_start);
    let price_series = match pipeline::price_series(spec.ticker, price_start).await {
        Ok(series) => Some(series),
        Err(err) => {
            summary.failure("price history", &err);
            None
        }
    };
    if let Some(series) = &price_series {
        persist(&mut summary, &opts.out_dir.join(spec.price_csv), series, "price series");
    }

    let (Some(price), Some(flow)) = (price_series, flow_series) else {
        info!(
            "Skipping {} flow chart: a required series is unavailable",
            spec.label
        );
        return summary;
    };

    match build_chart(spec, &opts.out_dir, &price, &flow) {
        Ok(path) => summary.success(format!("saved chart to {}", path.display())),
        Err(err) => summary.failure("chart", &err),
    }
    summary
}

fn scrape_flow_series(spec: &AssetSpec, opts: &FlowOptions) -> Result<NamedSeries> {
    let scraper = FlowScraper::new()?;
    let raw = scraper.scrape_flow_table(spec.flow_url, opts.dump_html.as_deref())?;
    Ok(normalize::normalize(&raw, &flow_schema(), "Total")?)
}

/// The scraped flow table groups its header and closes with the "Total"
/// column; the date column leads.
fn flow_schema() -> Schema {
    Schema {
        header_level: None,
        date_column: 0,
        value_column: ValueColumn::Last,
        drop_duplicate_header: true,
    }
}

fn build_chart(
    spec: &AssetSpec,
    out_dir: &Path,
    price: &NamedSeries,
    flow: &NamedSeries,
) -> Result<PathBuf> {
    // A day without a recorded flow is a zero-flow day, so the price dates
    // drive the join.
    let records = series::merge(price, flow, Join::LeftZeroFill)?;

    let price_joined = merge::primary_series(&records, format!("{} Price", spec.label));
    let flow_joined = merge::secondary_series(&records, "Total");
    let cumulative = series::cumulative_sum(&flow_joined, "Cumulative Inflow");
    let emas: Vec<NamedSeries> = EMA_SPANS
        .iter()
        .map(|&span| series::ema(&price_joined, span, format!("EMA {span}-Day")))
        .collect();

    let path = out_dir.join(spec.flow_chart);
    chart::render_flow_chart(&price_joined, &emas, &cumulative, spec.label, &path)?;
    Ok(path)
}
