//! Daemon error types.
//!
//! Everything here is fatal: it stops the process before the first cycle.
//! Failures inside a cycle are reported by the engine and never reach this
//! type.

use kegos_gsuite::DirectoryError;
use kegos_keycloak::KeycloakError;
use kegos_sync::SyncError;
use thiserror::Error;

use crate::config::ConfigErrors;

/// Startup error.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Invalid arguments.
    #[error("{0}")]
    Config(#[from] ConfigErrors),

    /// Logging could not be initialised.
    #[error("failed initialising logging: {0}")]
    Logging(String),

    /// Google client could not be created.
    #[error("failed creating Google Workspace client: {0}")]
    Gsuite(#[from] DirectoryError),

    /// Keycloak client could not be created.
    #[error("failed creating Keycloak client: {0}")]
    Keycloak(#[from] KeycloakError),

    /// Engine settings were rejected.
    #[error("failed creating runner: {0}")]
    Sync(#[from] SyncError),
}

/// Result type for daemon startup.
pub type DaemonResult<T> = Result<T, DaemonError>;
