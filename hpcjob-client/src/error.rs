//! Error types for the HPC job client

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the HPC job client
///
/// Every variant propagates straight to the caller; nothing in this crate
/// retries.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Insufficient or contradictory construction arguments
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Operation needs a job identity that does not exist
    #[error("Lifecycle error: {0}")]
    Lifecycle(String),

    /// Operation needs a state the job has not reached yet
    #[error("Not ready: {0}")]
    NotReady(String),

    /// Job not found, or the access token does not match it
    #[error("Job not found: {0}")]
    NotFound(String),

    /// Gateway returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the gateway, verbatim
        message: String,
    },

    /// HTTP request could not be completed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// A polling loop ran past its deadline
    #[error("Polling timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Deserialize)]
struct GatewayErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Create an API error from a raw response body
    ///
    /// The gateway wraps failures as `{"error": "..."}`; that message is kept
    /// as-is. Any other body is used whole.
    pub fn from_body(status: u16, body: String) -> Self {
        let message = serde_json::from_str::<GatewayErrorBody>(&body)
            .ok()
            .and_then(|parsed| parsed.error.or(parsed.message))
            .unwrap_or(body);
        Self::api_error(status, message)
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if the gateway refused the access token
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::ApiError { status: 401 | 403, .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}
