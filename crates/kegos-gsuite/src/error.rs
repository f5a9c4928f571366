//! Directory client error types.
//!
//! Messages never include the private key or access tokens.

use kegos_sync::SyncError;
use thiserror::Error;

/// Errors returned by the Google directory client.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The service-account key file is missing or malformed.
    #[error("credentials error: {0}")]
    Credentials(String),

    /// The JWT assertion could not be signed.
    #[error("signing error: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// The token endpoint refused the assertion.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Directory API answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// Response could not be interpreted.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl DirectoryError {
    /// Creates a credentials error.
    #[must_use]
    pub fn credentials(msg: impl Into<String>) -> Self {
        Self::Credentials(msg.into())
    }

    /// Creates an authentication error.
    #[must_use]
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Creates a protocol error.
    #[must_use]
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }
}

impl From<DirectoryError> for SyncError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Credentials(msg) => Self::config(msg),
            DirectoryError::Signing(e) => Self::auth_failed(e.to_string()),
            DirectoryError::Auth(msg) => Self::auth_failed(msg),
            DirectoryError::Api { status, message } => Self::api(status, message),
            DirectoryError::Protocol(msg) => Self::protocol(msg),
            DirectoryError::Http(e) if e.is_timeout() => Self::Timeout(e.to_string()),
            DirectoryError::Http(e) => Self::connection(e.to_string()),
        }
    }
}

/// Result type for directory client operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;
