//! Identity domain model.
//!
//! An identity is a user known to the target system. The engine never
//! creates or deletes identities; it only reads them every cycle.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A target-system user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique identifier assigned by the target system.
    ///
    /// Treated as opaque: federated users carry ids such as
    /// `f:<component>:<external id>`.
    pub id: String,
    /// Unique username, used as the lookup key in the source directory.
    pub username: String,
    /// Email address, only used for log context.
    pub email: Option<String>,
}

impl Identity {
    /// Creates a new identity.
    #[must_use]
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: None,
        }
    }

    /// Sets the email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}
