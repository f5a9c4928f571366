//! # kegos-gsuite
//!
//! Google Workspace directory client.
//!
//! [`DirectoryClient`] implements the engine's
//! [`SourceDirectory`](kegos_sync::SourceDirectory): for a user it returns
//! the email of every group the user belongs to, as reported by the Admin
//! SDK Directory API. Requests are authorised with a service-account key,
//! optionally impersonating a delegated admin.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod credentials;
pub mod error;
pub mod token;

pub use client::{DirectoryClient, DEFAULT_API_BASE_URL};
pub use credentials::{ServiceAccountKey, DEFAULT_TOKEN_URI};
pub use error::{DirectoryError, DirectoryResult};
pub use token::{TokenSource, DIRECTORY_SCOPES};
