//! Keycloak client configuration.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::{KeycloakError, KeycloakResult};

/// Default timeout for every HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the Keycloak admin API.
#[derive(Debug, Clone)]
pub struct KeycloakConfig {
    /// Server base URL (e.g., `https://sso.example.com`), without trailing slash.
    pub base_url: String,

    /// Realm holding the synchronised users and groups.
    pub realm: String,

    /// Confidential client used for the client-credentials grant.
    pub client_id: String,

    /// Client secret.
    pub client_secret: SecretString,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl KeycloakConfig {
    /// Creates a configuration with the default timeout.
    pub fn new(
        base_url: impl Into<String>,
        realm: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> KeycloakResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(KeycloakError::config(format!(
                "base URL must be an absolute http(s) URL: {base_url}"
            )));
        }

        let realm = realm.into();
        if realm.is_empty() {
            return Err(KeycloakError::config("realm must not be empty"));
        }

        let client_id = client_id.into();
        if client_id.is_empty() {
            return Err(KeycloakError::config("client id must not be empty"));
        }

        Ok(Self {
            base_url,
            realm,
            client_id,
            client_secret,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Token endpoint of the realm.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.base_url,
            urlencoding::encode(&self.realm)
        )
    }

    /// Admin API URL for `path` (which must start with `/`).
    #[must_use]
    pub fn admin_url(&self, path: &str) -> String {
        format!(
            "{}/admin/realms/{}{}",
            self.base_url,
            urlencoding::encode(&self.realm),
            path
        )
    }
}
