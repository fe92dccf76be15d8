use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sheet store returned status {0}")]
    Status(u16),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sheet store did not answer within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Row {row}: missing column '{column}'")]
    MissingColumn { row: usize, column: &'static str },

    #[error("Row {row}: invalid timestamp '{text}': {source}")]
    Timestamp {
        row: usize,
        text: String,
        #[source]
        source: chrono::ParseError,
    },
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Mail relay did not answer within {0:?}")]
    Timeout(Duration),
}

/// Failure of a single refresh tick. The tick's views are not published.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),
}
