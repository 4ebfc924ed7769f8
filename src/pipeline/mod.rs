//! Report orchestration
//!
//! One module per report variant. Both follow the same shape: fetch each
//! source on its own branch, persist whatever cleaned series exist, and
//! only then decide whether the chart can be built. A branch failure never
//! takes the process down; it lands in the run summary instead.

pub mod flow;
pub mod supply;

use chrono::{NaiveDate, Utc};
use colored::Colorize;
use tracing::error;

use crate::error::Result;
use crate::normalize::{self, Schema, ValueColumn};
use crate::pricing;
use crate::series::NamedSeries;

/// Collected stage outcomes of one report run, printed once at the end.
#[derive(Debug)]
pub struct RunSummary {
    title: String,
    completed: Vec<String>,
    failed: Vec<(String, String)>,
}

impl RunSummary {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            completed: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.completed.push(message.into());
    }

    pub fn failure(&mut self, stage: impl Into<String>, err: &anyhow::Error) {
        let stage = stage.into();
        error!("{}: {} failed: {:#}", self.title, stage, err);
        self.failed.push((stage, format!("{err:#}")));
    }

    /// A run is complete when every attempted stage succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn print(&self) {
        println!("\n{}", self.title.bold());
        for line in &self.completed {
            println!("  {} {}", "✓".green().bold(), line);
        }
        for (stage, reason) in &self.failed {
            println!("  {} {}: {}", "✗".red().bold(), stage, reason);
        }
    }
}

/// Save a cleaned series as CSV, recording the outcome either way.
pub(crate) fn persist(
    summary: &mut RunSummary,
    path: &std::path::Path,
    series: &NamedSeries,
    what: &str,
) {
    match crate::export::write_series(path, series) {
        Ok(()) => summary.success(format!("saved {} to {}", what, path.display())),
        Err(err) => summary.failure(format!("{what} CSV"), &err),
    }
}

/// Fetch and clean the daily close series for a ticker, from `start` through
/// today. Shared by both report variants so the multi-level header
/// flattening is applied identically everywhere.
pub(crate) async fn price_series(ticker: &str, start: NaiveDate) -> Result<NamedSeries> {
    let today = Utc::now().date_naive();
    let raw = pricing::fetch_price(ticker, start, today).await?;
    Ok(normalize::normalize(&raw, &price_schema(), "Price")?)
}

/// The price grid arrives with field-over-ticker column labels; keep the
/// field level.
fn price_schema() -> Schema {
    Schema {
        header_level: Some(0),
        date_column: 0,
        value_column: ValueColumn::Last,
        drop_duplicate_header: false,
    }
}
