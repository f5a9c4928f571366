//! Admin SDK Directory API client.

use std::time::Duration;

use kegos_sync::{SourceDirectory, SyncResult};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::credentials::ServiceAccountKey;
use crate::error::{DirectoryError, DirectoryResult};
use crate::token::TokenSource;

/// Public Directory API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://admin.googleapis.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One page of `groups.list`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupsPage {
    #[serde(default)]
    groups: Vec<DirectoryGroup>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectoryGroup {
    email: String,
}

/// Read-only client for the groups of a Google Workspace domain.
#[derive(Debug)]
pub struct DirectoryClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenSource,
}

impl DirectoryClient {
    /// Creates a client authenticating as the service account of `key`,
    /// impersonating `subject` when given.
    pub fn new(key: ServiceAccountKey, subject: Option<String>) -> DirectoryResult<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let tokens = TokenSource::new(http.clone(), key, subject)?;
        Ok(Self {
            http,
            base_url: DEFAULT_API_BASE_URL.to_string(),
            tokens,
        })
    }

    /// Points the client at another API endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns the API endpoint.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the email of every group `user_key` belongs to in `domain`,
    /// following `nextPageToken` until the last page.
    #[instrument(skip(self))]
    pub async fn groups_for_user(&self, domain: &str, user_key: &str) -> DirectoryResult<Vec<String>> {
        let url = format!("{}/admin/directory/v1/groups", self.base_url);
        let mut emails = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let access_token = self.tokens.token().await?;
            let mut request = self
                .http
                .get(&url)
                .bearer_auth(access_token)
                .query(&[("domain", domain), ("userKey", user_key)]);
            if let Some(token) = page_token.take() {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request.send().await?;

            let status = response.status();
            if !status.is_success() {
                if status == StatusCode::UNAUTHORIZED {
                    self.tokens.invalidate().await;
                }
                let message = response.text().await.unwrap_or_default();
                return Err(DirectoryError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let page: GroupsPage = response
                .json()
                .await
                .map_err(|e| DirectoryError::protocol(format!("invalid groups page: {e}")))?;
            emails.extend(page.groups.into_iter().map(|g| g.email));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(groups = emails.len(), "fetched user groups");
        Ok(emails)
    }
}

impl SourceDirectory for DirectoryClient {
    async fn groups_for_identity(&self, domain: &str, username: &str) -> SyncResult<Vec<String>> {
        Ok(self.groups_for_user(domain, username).await?)
    }
}
