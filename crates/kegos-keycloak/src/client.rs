//! Keycloak admin REST client.

use kegos_model::{Group, Identity};
use kegos_sync::{PageRequest, SyncResult, TargetDirectory};
use reqwest::header::LOCATION;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::KeycloakConfig;
use crate::dto::{
    id_from_location, path_segment, GroupRepresentation, NewGroup, UserRepresentation,
};
use crate::error::{KeycloakError, KeycloakResult};
use crate::token::TokenCache;

/// Admin API client for one realm.
#[derive(Debug)]
pub struct KeycloakAdminClient {
    http: reqwest::Client,
    config: KeycloakConfig,
    tokens: TokenCache,
}

impl KeycloakAdminClient {
    /// Creates a client. No request is sent until the first call.
    pub fn new(config: KeycloakConfig) -> KeycloakResult<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let tokens = TokenCache::new(http.clone(), &config);
        Ok(Self {
            http,
            config,
            tokens,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &KeycloakConfig {
        &self.config
    }

    /// Requests a fresh access token.
    pub async fn login(&self) -> KeycloakResult<()> {
        self.tokens.invalidate().await;
        self.tokens.token().await.map(|_| ())
    }

    /// Lists one page of realm users.
    #[instrument(skip(self))]
    pub async fn users(&self, page: PageRequest) -> KeycloakResult<Vec<Identity>> {
        let users: Vec<UserRepresentation> = self.get("/users", &page_query(page)).await?;
        Ok(users.into_iter().map(Identity::from).collect())
    }

    /// Lists one page of the direct subgroups of `parent`.
    #[instrument(skip(self, parent), fields(parent = %parent.path))]
    pub async fn group_children(
        &self,
        parent: &Group,
        page: PageRequest,
    ) -> KeycloakResult<Vec<Group>> {
        let path = format!("/groups/{}/children", path_segment(&parent.id));
        let groups: Vec<GroupRepresentation> = self.get(&path, &page_query(page)).await?;
        Ok(groups
            .into_iter()
            .map(|g| g.into_group(Some(parent)))
            .collect())
    }

    /// Lists one page of the groups `identity` belongs to.
    #[instrument(skip(self, identity), fields(user = %identity.username))]
    pub async fn user_groups(
        &self,
        identity: &Identity,
        page: PageRequest,
    ) -> KeycloakResult<Vec<Group>> {
        let path = format!("/users/{}/groups", path_segment(&identity.id));
        let groups: Vec<GroupRepresentation> = self.get(&path, &page_query(page)).await?;
        Ok(groups.into_iter().map(|g| g.into_group(None)).collect())
    }

    /// Searches for a top-level group whose name is exactly `name`.
    #[instrument(skip(self))]
    pub async fn top_level_group(&self, name: &str) -> KeycloakResult<Option<Group>> {
        let query = [
            ("search", name.to_string()),
            ("exact", "true".to_string()),
        ];
        let groups: Vec<GroupRepresentation> = self.get("/groups", &query).await?;

        Ok(groups
            .into_iter()
            .map(|g| g.into_group(None))
            .find(|group| group.name == name && group.group_path().depth() == 1))
    }

    /// Creates a group, as a subgroup of `parent` when given.
    #[instrument(skip(self, parent))]
    pub async fn create(&self, name: &str, parent: Option<&Group>) -> KeycloakResult<Group> {
        let path = match parent {
            Some(parent) => format!("/groups/{}/children", path_segment(&parent.id)),
            None => "/groups".to_string(),
        };
        let request = self
            .http
            .post(self.config.admin_url(&path))
            .json(&NewGroup { name });
        let response = self.send(request).await?;

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| KeycloakError::protocol("group created without a Location header"))?;
        let id = id_from_location(location)?;
        debug!(group = %name, id = %id, "created group");

        Ok(match parent {
            Some(parent) => Group::child_of(parent, id, name),
            None => Group::top_level(id, name),
        })
    }

    /// Adds the user to the group.
    #[instrument(skip(self))]
    pub async fn join_group(&self, user_id: &str, group_id: &str) -> KeycloakResult<()> {
        let url = self.membership_url(user_id, group_id);
        self.send(self.http.put(url)).await.map(|_| ())
    }

    /// Removes the user from the group.
    #[instrument(skip(self))]
    pub async fn leave_group(&self, user_id: &str, group_id: &str) -> KeycloakResult<()> {
        let url = self.membership_url(user_id, group_id);
        self.send(self.http.delete(url)).await.map(|_| ())
    }

    fn membership_url(&self, user_id: &str, group_id: &str) -> String {
        self.config.admin_url(&format!(
            "/users/{}/groups/{}",
            path_segment(user_id),
            path_segment(group_id)
        ))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> KeycloakResult<T> {
        let request = self.http.get(self.config.admin_url(path)).query(query);
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|e| KeycloakError::protocol(format!("invalid response body: {e}")))
    }

    /// Sends an authorized request and turns error statuses into errors.
    async fn send(&self, request: RequestBuilder) -> KeycloakResult<Response> {
        let token = self.tokens.token().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let err = KeycloakError::Api {
            status: status.as_u16(),
            message,
        };
        if err.is_unauthorized() {
            self.tokens.invalidate().await;
        }
        Err(err)
    }
}

fn page_query(page: PageRequest) -> [(&'static str, String); 2] {
    [
        ("first", page.first.to_string()),
        ("max", page.max.to_string()),
    ]
}

impl TargetDirectory for KeycloakAdminClient {
    async fn authenticate(&self) -> SyncResult<()> {
        Ok(self.login().await?)
    }

    async fn list_users(&self, page: PageRequest) -> SyncResult<Vec<Identity>> {
        Ok(self.users(page).await?)
    }

    async fn list_group_children(
        &self,
        parent: &Group,
        page: PageRequest,
    ) -> SyncResult<Vec<Group>> {
        Ok(self.group_children(parent, page).await?)
    }

    async fn list_user_groups(
        &self,
        identity: &Identity,
        page: PageRequest,
    ) -> SyncResult<Vec<Group>> {
        Ok(self.user_groups(identity, page).await?)
    }

    async fn find_group_exact(&self, name: &str) -> SyncResult<Option<Group>> {
        Ok(self.top_level_group(name).await?)
    }

    async fn create_group(&self, name: &str, parent: Option<&Group>) -> SyncResult<Group> {
        Ok(self.create(name, parent).await?)
    }

    async fn add_membership(&self, identity: &Identity, group: &Group) -> SyncResult<()> {
        Ok(self.join_group(&identity.id, &group.id).await?)
    }

    async fn remove_membership(&self, identity: &Identity, group: &Group) -> SyncResult<()> {
        Ok(self.leave_group(&identity.id, &group.id).await?)
    }
}
