//! Yahoo Finance chart API client for daily close history

use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::table::RawTable;

const CHART_API_BASE: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Fetch daily closes for a ticker over `[start_date, end_date]` inclusive.
///
/// The grid mirrors the upstream two-level column labels (field over
/// ticker); collapsing to the field level is the normalizer's job, never
/// done here, so every caller gets the identical flattening.
pub async fn fetch_price(
    ticker: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<RawTable> {
    info!(
        "Fetching {} daily closes from Yahoo Finance ({} to {})",
        ticker, start_date, end_date
    );

    let period1 = start_date.and_time(NaiveTime::MIN).and_utc().timestamp();
    // the API treats period2 as exclusive; ask through the following midnight
    let period2 = end_date
        .succ_opt()
        .unwrap_or(end_date)
        .and_time(NaiveTime::MIN)
        .and_utc()
        .timestamp();

    let client = Client::builder().user_agent(USER_AGENT).build()?;
    let url = format!("{CHART_API_BASE}/{ticker}");
    let response = client
        .get(&url)
        .query(&[
            ("period1", period1.to_string()),
            ("period2", period2.to_string()),
            ("interval", "1d".to_string()),
        ])
        .send()
        .await
        .context("Failed to send request to Yahoo Finance")?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow::Error::new(empty_response(ticker))
            .context(format!("Yahoo Finance returned error status: {status}")));
    }

    let payload: ChartResponse = response
        .json()
        .await
        .context("Failed to parse Yahoo Finance response")?;
    let result = payload
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| empty_response(ticker))?;
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|block| block.close)
        .unwrap_or_default();

    let mut rows = Vec::new();
    for (seconds, close) in result.timestamp.iter().zip(closes) {
        let (Some(timestamp), Some(close)) = (DateTime::from_timestamp(*seconds, 0), close)
        else {
            continue;
        };
        rows.push(vec![
            timestamp.date_naive().format("%Y-%m-%d").to_string(),
            close.to_string(),
        ]);
    }
    if rows.is_empty() {
        return Err(empty_response(ticker).into());
    }

    info!("Downloaded {} price rows for {}", rows.len(), ticker);
    Ok(RawTable::new(
        vec![
            vec!["Date".to_string(), "Close".to_string()],
            vec![String::new(), ticker.to_string()],
        ],
        rows,
    ))
}

fn empty_response(ticker: &str) -> PipelineError {
    PipelineError::EmptyResponse {
        source_name: format!("Yahoo Finance ({ticker})"),
    }
}
