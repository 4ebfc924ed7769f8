use anyhow::{anyhow, Result};
use clap::Parser;

use coinflow::assets::Asset;
use coinflow::cli::{Cli, Commands};
use coinflow::pipeline::flow::{self, FlowOptions};
use coinflow::pipeline::supply::{self, SupplyOptions};
use coinflow::pipeline::RunSummary;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let summaries: Vec<RunSummary> = match cli.command {
        Commands::Flow {
            asset,
            start_date,
            dump_html,
        } => {
            let opts = FlowOptions {
                start_date,
                out_dir: cli.out_dir.clone(),
                dump_html,
            };
            vec![flow::run(&asset.spec(), &opts).await]
        }

        Commands::Supply { asset, start_date } => {
            let opts = SupplyOptions {
                start_date,
                out_dir: cli.out_dir.clone(),
            };
            vec![supply::run(&asset.spec(), &opts).await]
        }

        Commands::All => {
            let mut summaries = Vec::new();
            for asset in [Asset::Btc, Asset::Eth] {
                let opts = FlowOptions {
                    start_date: None,
                    out_dir: cli.out_dir.clone(),
                    dump_html: None,
                };
                summaries.push(flow::run(&asset.spec(), &opts).await);
            }
            let opts = SupplyOptions {
                start_date: None,
                out_dir: cli.out_dir.clone(),
            };
            summaries.push(supply::run(&Asset::Btc.spec(), &opts).await);
            summaries
        }
    };

    for summary in &summaries {
        summary.print();
    }

    let incomplete: Vec<&str> = summaries
        .iter()
        .filter(|summary| !summary.is_complete())
        .map(RunSummary::title)
        .collect();
    if incomplete.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("incomplete report(s): {}", incomplete.join(", ")))
    }
}
