//! Error type for the remote collection adapter.

use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong talking to the books endpoint. The UI maps
/// these into footer notifications; nothing here is fatal after startup.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed: connection refused, timeout, or another
    /// transport failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered outside the 2xx range. Local state must not be
    /// patched when this comes back.
    #[error("server returned {status} for {url}")]
    Status { status: StatusCode, url: String },

    /// The response body was not the JSON shape we expect.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Specialized `Result` used throughout the adapter.
pub type Result<T> = std::result::Result<T, ApiError>;
