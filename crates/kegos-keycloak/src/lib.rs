//! # kegos-keycloak
//!
//! Keycloak admin REST client.
//!
//! [`KeycloakAdminClient`] implements the engine's
//! [`TargetDirectory`](kegos_sync::TargetDirectory) over the admin API of a
//! single realm, authenticating with the client-credentials grant.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod dto;
pub mod error;
pub mod token;

pub use client::KeycloakAdminClient;
pub use config::{KeycloakConfig, DEFAULT_REQUEST_TIMEOUT};
pub use error::{KeycloakError, KeycloakResult};
pub use token::TokenCache;
