mod common;

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kashtat_admin_client::store::{CredentialStore, MemoryStore, TOKEN_KEY, USER_KEY};
use kashtat_admin_client::{ApiClient, Config, Error, RequestDescriptor};

use common::config;

#[tokio::test]
async fn login_stores_token_and_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/v1/login"))
        .and(header("Accept", "application/json"))
        .and(body_json(json!({ "email": "admin@kashtat.com", "password": "secret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "admin-token",
            "user": { "id": 1, "name": "Admin" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let client = ApiClient::with_store(config(&server), store.clone()).unwrap();
    let session = client.session();

    assert!(!session.is_authenticated());
    let outcome = session
        .login("admin@kashtat.com", "secret")
        .await
        .expect("login");

    assert_eq!(outcome.token.as_str(), "admin-token");
    assert_eq!(outcome.user, json!({ "id": 1, "name": "Admin" }));
    assert!(session.is_authenticated());
    assert_eq!(session.current_user(), Some(json!({ "id": 1, "name": "Admin" })));
    assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("admin-token"));
}

#[tokio::test]
async fn rejected_login_surfaces_server_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/v1/login"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": { "description": "Invalid credentials" }
        })))
        .mount(&server)
        .await;

    let client = ApiClient::with_store(config(&server), Arc::new(MemoryStore::new())).unwrap();
    let session = client.session();

    match session.login("admin@kashtat.com", "wrong").await {
        Err(Error::Auth(msg)) => assert_eq!(msg, "Invalid credentials"),
        other => panic!("expected Error::Auth, got {:?}", other),
    }
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn me_requires_a_token() {
    let server = MockServer::start().await;
    let client = ApiClient::with_store(config(&server), Arc::new(MemoryStore::new())).unwrap();

    match client.session().me().await {
        Err(Error::Auth(msg)) => assert_eq!(msg, "No token found"),
        other => panic!("expected Error::Auth, got {:?}", other),
    }
}

#[tokio::test]
async fn me_returns_server_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/v1/me"))
        .and(header("Authorization", "Bearer admin-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": { "id": 1, "role": "admin" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    store.set(TOKEN_KEY, "admin-token").unwrap();
    let client = ApiClient::with_store(config(&server), store).unwrap();

    let user = client.session().me().await.expect("me");
    assert_eq!(user, json!({ "id": 1, "role": "admin" }));
}

#[tokio::test]
async fn logout_clears_credentials() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    store.set(TOKEN_KEY, "admin-token").unwrap();
    store.set(USER_KEY, "{\"id\":1}").unwrap();
    let client = ApiClient::with_store(config(&server), store.clone()).unwrap();
    let session = client.session();

    session.logout().unwrap();

    assert!(!session.is_authenticated());
    assert_eq!(session.current_user(), None);
    assert_eq!(store.get(USER_KEY), None);
}

#[tokio::test]
async fn file_store_survives_client_restart() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/users"))
        .and(header("Authorization", "Bearer persisted"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let mut store_path = PathBuf::from("target");
    store_path.push(format!("session-store-{}.json", server.address().port()));
    let _ = std::fs::remove_file(&store_path);
    let cfg = Config {
        store_path: Some(store_path.clone()),
        ..config(&server)
    };

    {
        let first = ApiClient::new(cfg.clone()).unwrap();
        first
            .tokens()
            .save_token(&kashtat_admin_client::token::AccessToken::new("persisted"));
    }

    let restarted = ApiClient::new(cfg).unwrap();
    let resp = restarted
        .request(&RequestDescriptor::get("/users"))
        .await
        .unwrap();
    assert!(resp.is_success());
}
