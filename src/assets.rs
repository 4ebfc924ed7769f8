//! Hardcoded parameters for the two supported assets
//!
//! Everything a pipeline invocation needs travels in the [`AssetSpec`]
//! value, so concurrent runs cannot interfere through shared configuration.

use chrono::NaiveDate;
use clap::ValueEnum;

/// Assets the reports cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Asset {
    Btc,
    Eth,
}

/// Per-asset parameters for one pipeline invocation.
#[derive(Debug, Clone)]
pub struct AssetSpec {
    pub label: &'static str,
    pub coinmetrics_id: &'static str,
    pub ticker: &'static str,
    pub flow_url: &'static str,
    /// First spot-ETF trading day; fallback price window start when the
    /// flow scrape fails.
    pub flow_start: NaiveDate,
    /// Earliest date the price source covers for this asset.
    pub supply_start: NaiveDate,
    pub flow_csv: &'static str,
    pub price_csv: &'static str,
    pub supply_csv: &'static str,
    pub flow_chart: &'static str,
    pub supply_chart: &'static str,
}

impl Asset {
    pub fn spec(self) -> AssetSpec {
        match self {
            Asset::Btc => AssetSpec {
                label: "BTC",
                coinmetrics_id: "btc",
                ticker: "BTC-USD",
                flow_url: "https://farside.co.uk/bitcoin-etf-flow-all-data/",
                flow_start: date(2024, 1, 11),
                supply_start: date(2014, 9, 17),
                flow_csv: "bitcoin_etf_total_flow.csv",
                price_csv: "btc_price_data.csv",
                supply_csv: "btc_supply_data.csv",
                flow_chart: "graph_btc.html",
                supply_chart: "graph_btc_supply.html",
            },
            Asset::Eth => AssetSpec {
                label: "ETH",
                coinmetrics_id: "eth",
                ticker: "ETH-USD",
                flow_url: "https://farside.co.uk/ethereum-etf-flow-all-data/",
                flow_start: date(2024, 7, 23),
                supply_start: date(2015, 8, 7),
                flow_csv: "ethereum_etf_total_flow.csv",
                price_csv: "ethereum_price_data.csv",
                supply_csv: "ethereum_supply_data.csv",
                flow_chart: "graph_eth.html",
                supply_chart: "graph_eth_supply.html",
            },
        }
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("hardcoded date is valid")
}
