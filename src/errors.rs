use std::time::Duration;
use thiserror::Error;

/// Failures of the server-side search core. Malformed input is never an error:
/// it is normalized instead.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("content store unavailable: {0:#}")]
    HostUnavailable(#[source] anyhow::Error),
}

/// Failures talking to the search endpoint from the client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("search endpoint answered with status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}
