//! Errors raised while fetching and decoding Treasury feeds.

use thiserror::Error;

/// Treasury feed errors.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed feed document: {0}")]
    Malformed(String),

    /// The feed layout changed: a wrapper element did not have exactly one
    /// matching child.
    #[error("Expected exactly one <*{suffix}> under <{parent}>, found {count}")]
    Structure {
        parent: String,
        suffix: String,
        count: usize,
    },

    #[error("Invalid rate for {field}: {value:?}")]
    InvalidRate { field: String, value: String },

    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FeedResult<T> = Result<T, FeedError>;
