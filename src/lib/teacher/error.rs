use std::time::Duration;

use thiserror::Error;

/// Errors produced by the `DD-MM-YYYY` date codec.
#[derive(Error, Debug)]
pub enum DateError {
    #[error("`{value}` is not a DD-MM-YYYY date: {source}")]
    InvalidDateFormat {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Errors produced while talking to the teacher API.
///
/// Everything except [`FetchError::Fallback`] is swallowed by the fetchers
/// and replaced with fallback data, so only that variant ever reaches the store.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection refused, DNS failure and the like.
    #[error("Network failure: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The server answered with a non-2xx status.
    #[error("HTTP error! status: {0}")]
    Http(reqwest::StatusCode),

    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The fallback data itself could not be produced.
    #[error("Fallback data unavailable: {0}")]
    Fallback(String),
}

impl FetchError {
    pub fn is_fallback(&self) -> bool {
        matches!(self, FetchError::Fallback(_))
    }
}
