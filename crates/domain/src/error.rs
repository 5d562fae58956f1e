//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A navigation location could not be parsed.
    #[error("invalid location: {0}")]
    InvalidLocation(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A serialized user profile could not be decoded.
    #[error("invalid user profile: {0}")]
    InvalidProfile(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
