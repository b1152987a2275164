//! Client error types.

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status; `message` is the
    /// server's own `{"message"}` body when it sent one.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("This call requires authorization; log in first")]
    MissingToken,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Status code of an API-level error, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
