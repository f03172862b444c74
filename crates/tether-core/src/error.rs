//! Error types for the Tether pipeline

use std::convert::Infallible;

/// Result type alias using [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type for the request pipeline
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport failed to reach the upstream server
    #[error("Failed to reach upstream: {0}")]
    Upstream(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] http::Error),

    /// Internal error (should not happen in production)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<Infallible> for Error {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}
