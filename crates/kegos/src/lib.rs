//! # kegos
//!
//! Daemon keeping Keycloak group memberships in sync with Google Workspace.
//!
//! For every Keycloak user, the groups the user belongs to in Google
//! Workspace are mirrored as children of a configured parent group. Only
//! memberships under that parent are ever added or removed.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod daemon;
pub mod error;
pub mod logging;

pub use cli::Cli;
pub use config::{ConfigErrors, DaemonConfig, LogFormat, LogLevel};
pub use error::{DaemonError, DaemonResult};
