use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::assets::Asset;

#[derive(Parser)]
#[command(name = "coinflow")]
#[command(version, about = "Crypto spot-ETF flow and on-chain supply chart generator")]
#[command(
    long_about = "Fetches spot-ETF flow tables, on-chain supply metrics, and price history for BTC and ETH, then renders interactive dual-axis HTML charts and saves the cleaned series as CSV."
)]
pub struct Cli {
    /// Directory where charts and CSV files are written
    #[arg(long = "out-dir", global = true, default_value = ".")]
    pub out_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Price vs. cumulative spot-ETF net inflow report
    Flow {
        /// Asset to report on
        #[arg(value_enum)]
        asset: Asset,

        /// Override the price-history start date (defaults to the first
        /// scraped flow date)
        #[arg(long, value_name = "YYYY-MM-DD")]
        start_date: Option<NaiveDate>,

        /// Save the scraped page HTML to this path for inspection
        #[arg(long, value_name = "PATH")]
        dump_html: Option<PathBuf>,
    },

    /// Price vs. total on-chain supply report
    Supply {
        /// Asset to report on
        #[arg(value_enum, default_value = "btc")]
        asset: Asset,

        /// Override the series start date
        #[arg(long, value_name = "YYYY-MM-DD")]
        start_date: Option<NaiveDate>,
    },

    /// Run the three reference reports (BTC flow, ETH flow, BTC supply)
    All,
}
