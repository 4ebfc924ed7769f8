//! Error handling for the report pipeline
//!
//! Stage failures are typed so the orchestration layer can tell which branch
//! of a run went down and keep the others going. Everything else rides on
//! anyhow context chains.

use thiserror::Error;

/// Failures that terminate one stage of a report branch
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A fetch returned a non-2xx status or an empty payload
    #[error("{source_name} returned an empty response")]
    EmptyResponse { source_name: String },

    /// No scraped table matched the daily-flow selection rule
    #[error("no table matching the daily flow layout was found on the page")]
    NoMatchingTable,

    /// Cleaning dropped every row of a raw table
    #[error("series '{series}' had no rows left after cleaning")]
    EmptyAfterClean { series: String },

    /// A date join produced zero rows
    #[error("merged series share no dates")]
    MergeEmpty,
}

/// Result type alias for pipeline operations
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = PipelineError::EmptyResponse {
            source_name: "CoinMetrics".to_string(),
        };
        assert_eq!(err.to_string(), "CoinMetrics returned an empty response");

        let err = PipelineError::EmptyAfterClean {
            series: "Total".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "series 'Total' had no rows left after cleaning"
        );
    }

    #[test]
    fn test_anyhow_context_chains_errors() {
        use anyhow::Context;
        let result: Result<()> =
            Err(anyhow::Error::new(PipelineError::NoMatchingTable)).context("scrape failed");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("scrape failed"));
        assert!(err.downcast_ref::<PipelineError>().is_some());
    }
}
