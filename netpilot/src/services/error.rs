//! Errors from the REST collaborators.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// HTTP client setup or request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The response body was not what we expected.
    #[error("Failed to parse response: {0}")]
    Json(String),

    /// The consumer of the adapter has gone away.
    #[error("Channel closed")]
    ChannelClosed,
}
