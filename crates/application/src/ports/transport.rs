//! HTTP transport port

use async_trait::async_trait;
use warden_domain::{ApiRequest, ApiResponse};

/// Errors raised before a response was received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request timed out.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout that elapsed.
        timeout_ms: u64,
    },

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The response body could not be read.
    #[error("failed to read body: {0}")]
    Body(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Port for executing API requests.
///
/// Implementations resolve `request.path` against their base URL and return
/// every response, whatever its status. Status handling belongs to the
/// request pipeline.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a request and reads the full response.
    ///
    /// # Errors
    ///
    /// Returns an error if no response could be obtained.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}
