//! Keycloak client error types.

use kegos_sync::SyncError;
use thiserror::Error;

/// Errors returned by the Keycloak admin client.
#[derive(Debug, Error)]
pub enum KeycloakError {
    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Token endpoint rejected the client credentials.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Admin API answered with a non-success status.
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

impl KeycloakError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
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

    /// Checks if the access token was rejected.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }
}

impl From<KeycloakError> for SyncError {
    fn from(err: KeycloakError) -> Self {
        match err {
            KeycloakError::Config(msg) => Self::config(msg),
            KeycloakError::Auth(msg) => Self::auth_failed(msg),
            KeycloakError::Api { status, message } => Self::api(status, message),
            KeycloakError::Protocol(msg) => Self::protocol(msg),
            KeycloakError::Http(e) if e.is_timeout() => Self::Timeout(e.to_string()),
            KeycloakError::Http(e) => Self::connection(e.to_string()),
        }
    }
}

/// Result type for Keycloak client operations.
pub type KeycloakResult<T> = Result<T, KeycloakError>;
