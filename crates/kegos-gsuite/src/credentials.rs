//! Service-account key loading.

use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{DirectoryError, DirectoryResult};

/// Token endpoint used when the key file does not name one.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The parts of a service-account JSON key the client needs.
#[derive(Debug, Clone)]
pub struct ServiceAccountKey {
    /// Service account identity, used as the JWT issuer.
    pub client_email: String,

    /// PEM-encoded RSA private key.
    pub private_key: SecretString,

    /// Key id, sent as the JWT `kid` header.
    pub private_key_id: Option<String>,

    /// OAuth token endpoint.
    pub token_uri: String,
}

#[derive(Deserialize)]
struct KeyFile {
    #[serde(rename = "type")]
    kind: Option<String>,
    client_email: Option<String>,
    private_key: Option<String>,
    private_key_id: Option<String>,
    token_uri: Option<String>,
}

impl ServiceAccountKey {
    /// Reads and parses a key file.
    pub fn from_file(path: impl AsRef<Path>) -> DirectoryResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DirectoryError::credentials(format!("failed reading {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    /// Parses the JSON content of a key file.
    pub fn from_json(content: &str) -> DirectoryResult<Self> {
        let file: KeyFile = serde_json::from_str(content)
            .map_err(|e| DirectoryError::credentials(format!("invalid key file: {e}")))?;

        if let Some(kind) = file.kind.as_deref() {
            if kind != "service_account" {
                return Err(DirectoryError::credentials(format!(
                    "expected a service_account key, got {kind}"
                )));
            }
        }

        let client_email = file
            .client_email
            .filter(|s| !s.is_empty())
            .ok_or_else(|| DirectoryError::credentials("key file has no client_email"))?;
        let private_key = file
            .private_key
            .filter(|s| !s.is_empty())
            .ok_or_else(|| DirectoryError::credentials("key file has no private_key"))?;

        Ok(Self {
            client_email,
            private_key: SecretString::from(private_key),
            private_key_id: file.private_key_id,
            token_uri: file
                .token_uri
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
        })
    }
}
