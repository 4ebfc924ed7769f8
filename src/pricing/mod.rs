// Price history fetchers (currently Yahoo Finance only)

pub mod yahoo;

pub use yahoo::fetch_price;
