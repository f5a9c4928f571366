//! Admin API representations.
//!
//! Only the fields the engine needs are modelled; everything else in the
//! Keycloak payloads is ignored.

use kegos_model::{Group, Identity};
use serde::{Deserialize, Serialize};

use crate::error::{KeycloakError, KeycloakResult};

/// `UserRepresentation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRepresentation {
    /// User ID.
    pub id: String,
    /// Username.
    pub username: String,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<UserRepresentation> for Identity {
    fn from(user: UserRepresentation) -> Self {
        let identity = Self::new(user.id, user.username);
        match user.email {
            Some(email) => identity.with_email(email),
            None => identity,
        }
    }
}

/// `GroupRepresentation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRepresentation {
    /// Group ID.
    pub id: String,
    /// Group name.
    pub name: String,
    /// Full path. Some endpoints omit it for subgroups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl GroupRepresentation {
    /// Converts into a group handle, deriving a missing path from `parent`.
    #[must_use]
    pub fn into_group(self, parent: Option<&Group>) -> Group {
        match (self.path, parent) {
            (Some(path), _) if !path.is_empty() => Group::new(self.id, self.name, path),
            (_, Some(parent)) => Group::child_of(parent, self.id, self.name),
            (_, None) => Group::top_level(self.id, self.name),
        }
    }
}

/// Body of a group creation request.
#[derive(Debug, Clone, Serialize)]
pub struct NewGroup<'a> {
    /// Group name.
    pub name: &'a str,
}

/// Extracts the id of a created resource from its `Location` header.
pub fn id_from_location(location: &str) -> KeycloakResult<String> {
    let segment = location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let id = urlencoding::decode(segment)
        .map_err(|e| KeycloakError::protocol(format!("invalid Location header {location:?}: {e}")))?;
    if id.is_empty() {
        return Err(KeycloakError::protocol(format!(
            "no resource id in Location header {location:?}"
        )));
    }
    Ok(id.into_owned())
}

/// Encodes an opaque id for use as a URL path segment.
pub(crate) fn path_segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}
