// On-chain metrics fetchers (currently CoinMetrics only)

pub mod coinmetrics;

pub use coinmetrics::fetch_supply;
