//! # kegos-model
//!
//! Domain model for kegos (identities, groups and group paths).
//!
//! These types are shared by the synchronisation engine and by the
//! directory clients that feed it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod group;
pub mod identity;

pub use group::{Group, GroupPath, PATH_SEPARATOR};
pub use identity::Identity;
