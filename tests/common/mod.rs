#![allow(dead_code)]

use std::sync::Arc;

use kashtat_admin_client::store::{CredentialStore, MemoryStore, TOKEN_KEY};
use kashtat_admin_client::{ApiClient, Config};
use wiremock::MockServer;

pub const TOKEN_PATH: &str = "/v2/auth/token";

pub fn config(server: &MockServer) -> Config {
    Config::from_values(
        format!("{}/v2", server.uri()),
        format!("{}{TOKEN_PATH}", server.uri()),
        format!("{}/api/admin/v1", server.uri()),
        None,
        None,
        Some(5),
        None,
    )
}

/// Client whose store already holds `token`, when given.
pub fn client_with_token(server: &MockServer, token: Option<&str>) -> (ApiClient, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    if let Some(token) = token {
        store.set(TOKEN_KEY, token).unwrap();
    }
    let client = ApiClient::with_store(config(server), store.clone()).expect("client");
    (client, store)
}
