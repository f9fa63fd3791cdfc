//! Network error type shared by the raster fetch and statistics lookups.

use thiserror::Error;

/// Result type alias using NetworkError.
pub type NetworkResult<T> = Result<T, NetworkError>;

/// A failed request to the forecast service.
///
/// None of these are retried; the caller turns them into visible UI state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    /// Connection, DNS, TLS or timeout failure before a status was received.
    #[error("request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success HTTP status.
    #[error("server returned HTTP {status}")]
    Status { status: u16 },

    /// The body could not be read or parsed into the expected shape.
    #[error("malformed response body: {0}")]
    MalformedBody(String),
}

impl NetworkError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedBody(msg.into())
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            NetworkError::Transport(_) => "transport",
            NetworkError::Status { .. } => "status",
            NetworkError::MalformedBody(_) => "malformed",
        }
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(err: serde_json::Error) -> Self {
        NetworkError::MalformedBody(err.to_string())
    }
}
