//! CoinMetrics community API client for on-chain supply data
//!
//! One GET per run; a non-2xx status or an empty `data` array is an empty
//! response, and there are no retries.

use anyhow::Context;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::table::RawTable;

const API_URL: &str = "https://community-api.coinmetrics.io/v4/timeseries/asset-metrics";
const SUPPLY_METRIC: &str = "SplyCur";
const PAGE_SIZE: &str = "10000";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; CoinflowBot/1.0)";

#[derive(Debug, Deserialize)]
struct MetricsResponse {
    #[serde(default)]
    data: Vec<Value>,
}

/// Fetch the daily current-supply series for an asset since `start_date`.
///
/// Returns a raw `time` x metric grid; typing and date parsing happen in
/// normalization.
pub async fn fetch_supply(asset: &str, start_date: NaiveDate) -> Result<RawTable> {
    info!(
        "Fetching {} supply from CoinMetrics since {}",
        asset, start_date
    );

    let start_time = format!("{start_date}T00:00:00Z");
    let client = Client::builder().user_agent(USER_AGENT).build()?;
    let response = client
        .get(API_URL)
        .query(&[
            ("assets", asset),
            ("metrics", SUPPLY_METRIC),
            ("start_time", start_time.as_str()),
            ("frequency", "1d"),
            ("page_size", PAGE_SIZE),
        ])
        .send()
        .await
        .context("Failed to send request to CoinMetrics")?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow::Error::new(empty_response())
            .context(format!("CoinMetrics returned error status: {status}")));
    }

    let payload: MetricsResponse = response
        .json()
        .await
        .context("Failed to parse CoinMetrics response")?;
    if payload.data.is_empty() {
        return Err(empty_response().into());
    }

    let rows = payload
        .data
        .iter()
        .map(|entry| {
            vec![
                cell_text(entry.get("time")),
                cell_text(entry.get(SUPPLY_METRIC)),
            ]
        })
        .collect();

    info!("Downloaded {} supply rows", payload.data.len());
    Ok(RawTable::new(
        vec![vec!["time".to_string(), SUPPLY_METRIC.to_string()]],
        rows,
    ))
}

fn empty_response() -> PipelineError {
    PipelineError::EmptyResponse {
        source_name: "CoinMetrics".to_string(),
    }
}

/// The API serializes metric values as strings but is not contractual about
/// it; render non-string scalars through their JSON form.
fn cell_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
