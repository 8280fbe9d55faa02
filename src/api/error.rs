//! Transport-level errors

use thiserror::Error;

/// Failure of a single call against the PMO backend.
///
/// Never retried by this crate; whoever issued the call decides.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a status outside 2xx
    #[error("Request failed: {status} {status_text} - {body}")]
    RequestFailed {
        status: u16,
        status_text: String,
        body: String,
    },

    /// The request never produced a response (connection refused, timeout, ...)
    #[error("Failed to reach {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to encode request body for {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A 204 (or empty body) where an entity was expected
    #[error("Response from {path} had no body")]
    EmptyBody { path: String },
}

impl ApiError {
    /// HTTP status for `RequestFailed`, `None` otherwise
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}
