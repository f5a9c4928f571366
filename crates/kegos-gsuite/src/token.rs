//! Service-account access tokens (JWT bearer grant).
//!
//! The client signs a short-lived RS256 assertion with the service-account
//! key and trades it for an access token at the key's token endpoint. With a
//! subject set, the token acts on behalf of that delegated admin.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::credentials::ServiceAccountKey;
use crate::error::{DirectoryError, DirectoryResult};

/// Read-only scopes needed to list groups and users.
pub const DIRECTORY_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/admin.directory.group.readonly",
    "https://www.googleapis.com/auth/admin.directory.user.readonly",
];

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime of a signed assertion. Google caps it at one hour.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Claims of the signed assertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertionClaims {
    /// Service account email.
    pub iss: String,
    /// Space-separated scopes.
    pub scope: String,
    /// Token endpoint.
    pub aud: String,
    /// Issued at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
    /// Impersonated user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_expired(&self, grace_period: Duration) -> bool {
        Utc::now() + grace_period >= self.expires_at
    }
}

/// Issues and caches access tokens for the directory API.
pub struct TokenSource {
    http: reqwest::Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    subject: Option<String>,
    cached: Arc<RwLock<Option<CachedToken>>>,
    grace_period: Duration,
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSource")
            .field("client_email", &self.key.client_email)
            .field("token_uri", &self.key.token_uri)
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

impl TokenSource {
    /// Creates a token source. Fails if the private key is not a valid RSA PEM.
    pub fn new(
        http: reqwest::Client,
        key: ServiceAccountKey,
        subject: Option<String>,
    ) -> DirectoryResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.expose_secret().as_bytes())
            .map_err(|e| DirectoryError::credentials(format!("invalid private key: {e}")))?;

        Ok(Self {
            http,
            key,
            encoding_key,
            subject,
            cached: Arc::new(RwLock::new(None)),
            grace_period: Duration::minutes(1),
        })
    }

    /// Returns the impersonated subject, if any.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Returns a valid access token, exchanging a new assertion if needed.
    #[instrument(skip(self), fields(client_email = %self.key.client_email))]
    pub async fn token(&self) -> DirectoryResult<String> {
        {
            let cache = self.cached.read().await;
            if let Some(ref token) = *cache {
                if !token.is_expired(self.grace_period) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let token = self.exchange().await?;
        let access_token = token.access_token.clone();
        *self.cached.write().await = Some(token);
        Ok(access_token)
    }

    /// Drops the cached token.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }

    /// Signs an assertion issued at `now`.
    pub fn sign_assertion(&self, now: DateTime<Utc>) -> DirectoryResult<String> {
        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: DIRECTORY_SCOPES.join(" "),
            aud: self.key.token_uri.clone(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
            sub: self.subject.clone(),
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&self.key.private_key_id);
        Ok(encode(&header, &claims, &self.encoding_key)?)
    }

    async fn exchange(&self) -> DirectoryResult<CachedToken> {
        let assertion = self.sign_assertion(Utc::now())?;
        let params = [
            ("grant_type", JWT_BEARER_GRANT),
            ("assertion", assertion.as_str()),
        ];

        debug!(token_uri = %self.key.token_uri, "exchanging service account assertion");
        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::auth(format!(
                "token exchange failed with status {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| DirectoryError::protocol(format!("invalid token response: {e}")))?;

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        })
    }
}
