mod common;

use std::sync::Arc;

use agency_site::cache::{CacheBackend, CacheError, RedisClient, RestCacheBackend};
use common::usable_cache_config;
use reqwest::Client;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend(server: &MockServer) -> RestCacheBackend {
    RestCacheBackend::new(Client::new(), &server.uri(), "test-token")
}

#[tokio::test]
async fn test_set_sends_bearer_and_command_array() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!(["SET", "page:home", "{\"title\":\"Inicio\"}", "EX", "60"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "OK" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = RedisClient::with_backend(usable_cache_config(), Arc::new(backend(&server)));
    let ack = client.set("page:home", &json!({ "title": "Inicio" }), Some(60)).await;

    assert_eq!(ack, "OK");
}

#[tokio::test]
async fn test_get_decodes_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!(["GET", "page:home"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "{\"title\":\"Inicio\"}" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_json(json!(["GET", "missing"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": null })))
        .mount(&server)
        .await;

    let client = RedisClient::with_backend(usable_cache_config(), Arc::new(backend(&server)));

    let value: Option<serde_json::Value> = client.get("page:home").await;
    assert_eq!(value, Some(json!({ "title": "Inicio" })));
    assert_eq!(client.get::<serde_json::Value>("missing").await, None);
}

#[tokio::test]
async fn test_error_payload_is_a_command_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "ERR wrong number of arguments" })),
        )
        .mount(&server)
        .await;

    let err = backend(&server).get("k").await.unwrap_err();
    assert!(matches!(err, CacheError::Command(msg) if msg.contains("wrong number")));
}

#[tokio::test]
async fn test_unauthorized_status_degrades_to_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let err = backend(&server).ping().await.unwrap_err();
    assert!(matches!(err, CacheError::Status { status: 401, .. }));

    let client = RedisClient::with_backend(usable_cache_config(), Arc::new(backend(&server)));
    assert_eq!(client.ping().await, "ERROR");
    assert_eq!(client.get::<String>("k").await, None);
    assert_eq!(client.delete("k").await, 0);
}

#[tokio::test]
async fn test_keys_and_del() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!(["KEYS", "ai-chat:*"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": ["ai-chat:1", "ai-chat:2"] })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_json(json!(["DEL", "ai-chat:1", "ai-chat:2"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": 2 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = RedisClient::with_backend(usable_cache_config(), Arc::new(backend(&server)));
    assert_eq!(client.clear_pattern("ai-chat:*").await, 2);
}

#[tokio::test]
async fn test_unreachable_service_degrades() {
    // Puerto cerrado: error de transporte
    let backend = RestCacheBackend::new(Client::new(), "http://127.0.0.1:9", "test-token");
    assert!(matches!(backend.ping().await, Err(CacheError::Transport(_))));

    let client = RedisClient::with_backend(usable_cache_config(), Arc::new(backend));
    let value: Result<u32, ()> = client.get_with_cache("n", 60, || async { Ok(7) }).await;
    assert_eq!(value, Ok(7));
}
