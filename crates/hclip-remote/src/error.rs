//! Remote service error types.

use thiserror::Error;

pub type RemoteResult<T> = Result<T, RemoteError>;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RemoteError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RemoteError::ServiceUnavailable(_) | RemoteError::Network(_)
        )
    }

    /// Map a non-success HTTP status and body into an error.
    pub(crate) fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        let message = format!("service returned {}: {}", status, body);
        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            RemoteError::ServiceUnavailable(message)
        } else {
            RemoteError::RequestFailed(message)
        }
    }
}
