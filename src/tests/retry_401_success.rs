use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::store::{CredentialStore, MemoryStore, TOKEN_KEY};
use crate::tests::test_support::{TOKEN_PATH, base_config, capture_logs, drain_logs};
use crate::{ApiClient, RequestDescriptor};

#[tokio::test]
async fn retries_once_after_session_expired_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/packages"))
        .and(header("Authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "error": "session_expired"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/packages"))
        .and(header("Authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "packages": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_json(json!({ "old_token": "stale" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "fresh" })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    store.set(TOKEN_KEY, "stale").unwrap();
    let client = ApiClient::with_store(base_config(&server.uri()), store.clone()).unwrap();

    let (lines, guard) = capture_logs();
    let res = client.request(&RequestDescriptor::get("/packages")).await;
    drop(guard);

    let resp = res.expect("request should succeed after refresh");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert_eq!(resp.attempts(), 2);
    assert!(resp.is_success());
    assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("fresh"));

    let logs = drain_logs(lines);
    assert!(
        logs.iter()
            .any(|line| line.contains("WARN") && line.contains("401")),
        "expected warning log mentioning 401, got: {:?}",
        logs
    );
    assert!(
        logs.iter().any(|line| line.contains("request.retry")),
        "expected a retry event, got: {:?}",
        logs
    );
}

#[tokio::test]
async fn bare_401_is_retried_by_default() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v2/cities/7"))
        .and(header("Authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Unauthenticated." })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v2/cities/7"))
        .and(header("Authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "fresh" })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    store.set(TOKEN_KEY, "stale").unwrap();
    let client = ApiClient::with_store(base_config(&server.uri()), store).unwrap();

    let resp = client
        .request(&RequestDescriptor::delete("/cities/7"))
        .await
        .expect("retry after bare 401");
    assert_eq!(resp.attempts(), 2);
    assert!(resp.is_success());
}
