//! Scraper for farside.co.uk spot-ETF flow tables
//!
//! Drives headless Chrome so the client-side rendered tables exist in the
//! captured HTML, parses every table on the page, and picks the daily flow
//! table by content.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use headless_chrome::{Browser, LaunchOptions};
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::table::RawTable;

/// Fixed delay after navigation so client-side rendering can finish.
const SETTLE_DELAY: Duration = Duration::from_secs(5);

/// Scraper for the farside.co.uk daily flow pages.
///
/// Owns the browser session; dropping the scraper releases Chrome on every
/// exit path, including parse failures.
pub struct FlowScraper {
    browser: Browser,
}

impl FlowScraper {
    /// Launch headless Chrome with a realistic user agent and the usual
    /// automation-detection flags disabled.
    pub fn new() -> Result<Self> {
        info!("Launching headless Chrome browser");

        let options = LaunchOptions {
            headless: true,
            sandbox: false, // May be needed on some systems
            args: vec![
                std::ffi::OsStr::new("--disable-blink-features=AutomationControlled"),
                std::ffi::OsStr::new("--user-agent=Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36"),
                std::ffi::OsStr::new("--disable-dev-shm-usage"),
                std::ffi::OsStr::new("--window-size=1920,1080"),
            ],
            ..Default::default()
        };

        let browser = Browser::new(options)
            .context("Failed to launch headless Chrome. Is Chrome/Chromium installed?")?;

        Ok(Self { browser })
    }

    /// Render the page, capture its HTML, and return the daily flow table.
    ///
    /// `dump_html` optionally saves the captured HTML for inspection; a
    /// failed dump is only a warning.
    pub fn scrape_flow_table(&self, url: &str, dump_html: Option<&Path>) -> Result<RawTable> {
        info!("Scraping ETF flow table from: {}", url);

        let tab = self
            .browser
            .new_tab()
            .context("Failed to create new browser tab")?;

        tab.navigate_to(url).context("Failed to navigate to URL")?;
        tab.wait_for_element_with_custom_timeout("body", Duration::from_secs(10))
            .context("Timed out waiting for page to load")?;

        info!("Waiting for client-side rendering to settle...");
        std::thread::sleep(SETTLE_DELAY);

        let html = tab.get_content().context("Failed to get page content")?;

        if let Some(path) = dump_html {
            match std::fs::write(path, &html) {
                Ok(()) => info!("Saved page HTML to {} for debugging", path.display()),
                Err(e) => warn!("Failed to save debug HTML: {}", e),
            }
        }

        let candidates = parse_tables(&html);
        info!("Found {} table(s) on the page", candidates.len());
        select_flow_table(candidates)
    }
}

/// Parse every `<table>` in the document into a raw grid.
///
/// Leading all-`<th>` rows become header levels (grouped headers stack);
/// everything else is data.
pub fn parse_tables(html: &str) -> Vec<RawTable> {
    let Ok(table_sel) = Selector::parse("table") else {
        return Vec::new();
    };
    let Ok(row_sel) = Selector::parse("tr") else {
        return Vec::new();
    };
    let Ok(cell_sel) = Selector::parse("th, td") else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    document
        .select(&table_sel)
        .map(|table| parse_table(table, &row_sel, &cell_sel))
        .collect()
}

fn parse_table(table: ElementRef, row_sel: &Selector, cell_sel: &Selector) -> RawTable {
    let mut headers: Vec<Vec<String>> = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();

    for row in table.select(row_sel) {
        let mut cells = Vec::new();
        let mut all_header_cells = true;
        for cell in row.select(cell_sel) {
            if cell.value().name() != "th" {
                all_header_cells = false;
            }
            cells.push(cell_text(&cell));
        }
        if cells.is_empty() {
            continue;
        }
        if all_header_cells && rows.is_empty() {
            headers.push(cells);
        } else {
            rows.push(cells);
        }
    }

    RawTable::new(headers, rows)
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pick the daily flow table among the parsed candidates.
///
/// The rule is inherited from the source site's current layout and is
/// fragile against redesigns: the flow page always carries more than one
/// table, and the flow table is the one mentioning "Total" in its header or
/// holding it as a cell of its first data row. Treat a selection failure as
/// "the page changed", not as a bug here.
pub fn select_flow_table(candidates: Vec<RawTable>) -> Result<RawTable> {
    if candidates.len() < 2 {
        return Err(PipelineError::NoMatchingTable.into());
    }

    candidates
        .into_iter()
        .find(|table| {
            let header_hit = table.flattened_header().contains("Total");
            let first_row_hit = table
                .rows
                .first()
                .map(|row| row.iter().any(|cell| cell == "Total"))
                .unwrap_or(false);
            header_hit || first_row_hit
        })
        .ok_or_else(|| PipelineError::NoMatchingTable.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_header(labels: &[&str]) -> RawTable {
        RawTable::new(
            vec![labels.iter().map(|l| l.to_string()).collect()],
            vec![vec!["11 Jan 2024".to_string(), "1.5".to_string()]],
        )
    }

    #[test]
    fn test_selects_the_table_whose_header_mentions_total() {
        let candidates = vec![
            table_with_header(&["Date", "IBIT"]),
            table_with_header(&["Date", "Total"]),
            table_with_header(&["Date", "FBTC"]),
        ];
        let selected = select_flow_table(candidates).unwrap();
        assert_eq!(selected.header_at(None), vec!["Date", "Total"]);
    }

    #[test]
    fn test_selects_on_first_data_row_cell_match() {
        let navigation = table_with_header(&["Home", "About"]);
        let flow = RawTable::new(
            Vec::new(),
            vec![vec!["Date".to_string(), "Total".to_string()]],
        );
        let selected = select_flow_table(vec![navigation, flow]).unwrap();
        assert!(selected.headers.is_empty());
    }

    #[test]
    fn test_no_matching_table_when_nothing_mentions_total() {
        let candidates = vec![
            table_with_header(&["Date", "IBIT"]),
            table_with_header(&["Date", "FBTC"]),
        ];
        let err = select_flow_table(candidates).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::NoMatchingTable)
        ));
    }

    #[test]
    fn test_fewer_than_two_candidates_short_circuits() {
        // a single table, even a matching one, means the page layout changed
        let err = select_flow_table(vec![table_with_header(&["Date", "Total"])]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::NoMatchingTable)
        ));
    }

    #[test]
    fn test_parse_tables_extracts_headers_and_rows() {
        let html = r#"
            <html><body>
              <table>
                <tr><th>Home</th><th>About</th></tr>
              </table>
              <table>
                <thead>
                  <tr><th>Fund Flows</th><th>US$M</th></tr>
                  <tr><th>Date</th><th>Total</th></tr>
                </thead>
                <tbody>
                  <tr><td>11 Jan 2024</td><td>655.3</td></tr>
                  <tr><td>12 Jan 2024</td><td>(1.2)</td></tr>
                </tbody>
              </table>
            </body></html>
        "#;

        let tables = parse_tables(html);
        assert_eq!(tables.len(), 2);

        let flow = &tables[1];
        assert_eq!(flow.headers.len(), 2);
        assert_eq!(flow.header_at(None), vec!["Date", "Total"]);
        assert_eq!(flow.rows.len(), 2);
        assert_eq!(flow.rows[0], vec!["11 Jan 2024", "655.3"]);
    }

    #[test]
    fn test_parse_tables_normalizes_cell_whitespace() {
        let html = "<table><tr><td> 11 Jan\n 2024 </td><td><span>(</span>1.2<span>)</span></td></tr></table>";
        let tables = parse_tables(html);
        assert_eq!(tables[0].rows[0], vec!["11 Jan 2024", "( 1.2 )"]);
    }
}
