//! Shared fixtures for the admin client tests.

#![allow(dead_code)]

use kegos_keycloak::{KeycloakAdminClient, KeycloakConfig};
use secrecy::SecretString;
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REALM: &str = "corp";
pub const TOKEN: &str = "test-access-token";

pub fn client(server: &MockServer) -> KeycloakAdminClient {
    let config = KeycloakConfig::new(
        server.uri(),
        REALM,
        "kegos",
        SecretString::from("kegos-secret"),
    )
    .unwrap();
    KeycloakAdminClient::new(config).unwrap()
}

/// Mounts a token endpoint that accepts the test client credentials.
pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(format!("/realms/{REALM}/protocol/openid-connect/token")))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_secret=kegos-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": TOKEN,
            "expires_in": 300,
            "token_type": "Bearer"
        })))
        .mount(server)
        .await;
}

pub fn admin_path(rest: &str) -> String {
    format!("/admin/realms/{REALM}{rest}")
}

pub fn user(id: &str, username: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "email": format!("{username}@example.com"),
        "enabled": true
    })
}

pub fn group(id: &str, name: &str, path: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "path": path,
        "subGroupCount": 0,
        "subGroups": []
    })
}
