//! Client error types.

use thiserror::Error;

/// Result type for management API calls.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the management API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The API answered with a non-success status.
    #[error("request to {url} failed with status {status}: {body}")]
    RequestFailure {
        url: String,
        status: u16,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not contain the expected collection.
    #[error("unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Returns the HTTP status if the API rejected the request.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::RequestFailure { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns the URL of the failed request, when known.
    pub fn url(&self) -> Option<&str> {
        match self {
            ClientError::RequestFailure { url, .. } | ClientError::Decode { url, .. } => Some(url),
            _ => None,
        }
    }
}
