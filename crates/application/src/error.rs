//! Application error types

use thiserror::Error;
use warden_domain::{DomainError, StatusCode};

use crate::navigation::NavigationError;
use crate::ports::{StorageError, TransportError};

/// Why a token refresh did not produce a new access token.
///
/// Cloneable because one outcome is handed to every request queued behind
/// the refresh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// No refresh token is held.
    #[error("no refresh token available")]
    MissingRefreshToken,

    /// The backend refused the refresh token.
    #[error("refresh rejected with status {status}: {message}")]
    Rejected {
        /// Response status.
        status: u16,
        /// Server message or status text.
        message: String,
    },

    /// The refresh call never reached the backend.
    #[error("refresh request failed: {0}")]
    Transport(String),

    /// The response did not carry an access token.
    #[error("malformed refresh response: {0}")]
    MalformedResponse(String),

    /// The refresh call exceeded the configured timeout.
    #[error("refresh timed out after {timeout_secs}s")]
    TimedOut {
        /// Timeout that elapsed.
        timeout_secs: u64,
    },

    /// The refreshing request was dropped before it settled.
    #[error("refresh abandoned before completion")]
    Abandoned,

    /// The session was cleared or replaced while the refresh was pending;
    /// its result was discarded.
    #[error("session changed during refresh")]
    Superseded,
}

/// Failure surfaced by the request pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The transport could not complete the request.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Authorization failed and the token could not be refreshed.
    #[error("session refresh failed: {0}")]
    Refresh(#[from] RefreshError),

    /// Authorization failed again after the request was replayed.
    #[error("request unauthorized after token refresh: {status}")]
    Unauthorized {
        /// Status of the replayed request.
        status: StatusCode,
    },

    /// Non-success status other than an authorization failure.
    #[error("request failed with {status}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Response body as text.
        body: String,
    },
}

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// A key-value store operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// An API request failed.
    #[error("request error: {0}")]
    Pipeline(#[from] PipelineError),

    /// A route transition could not be completed.
    #[error("navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Credentials were rejected or login failed otherwise.
    #[error("login failed: {0}")]
    Login(String),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
