//! HTTP transport behaviour against a mock API server.

use std::time::Duration;

use channel_scout::api::{HttpTransport, RateGate, RetryPolicy, Transport};
use channel_scout::models::ApiConfig;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "SECRET-KEY";

fn transport(server: &MockServer, attempts: u32) -> HttpTransport {
    let config = ApiConfig {
        base_url: format!("{}/youtube/v3", server.uri()),
        timeout_secs: 2,
        ..ApiConfig::default()
    };
    HttpTransport::new(&config, KEY)
        .unwrap()
        .with_policy(RetryPolicy::immediate(attempts))
        .with_gate(RateGate::unlimited())
}

fn params(id: &str) -> Vec<(&'static str, String)> {
    vec![("part", "id".to_string()), ("id", id.to_string())]
}

#[tokio::test]
async fn test_retries_then_returns_error_as_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
        .expect(3)
        .mount(&server)
        .await;

    let err = transport(&server, 3)
        .get("channels", &params("UC1"))
        .await
        .unwrap_err();

    assert_eq!(err.status, Some(500));
    assert_eq!(err.attempts, 3);
    assert_eq!(err.body_excerpt.as_deref(), Some("backend error"));
    assert!(err.url.contains("id=UC1"));
    assert!(!err.url.contains(KEY));
    assert!(!err.to_string().contains(KEY));
}

#[tokio::test]
async fn test_credential_sent_on_every_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels"))
        .and(query_param("key", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let value = transport(&server, 3)
        .get("channels", &params("UC1"))
        .await
        .unwrap();
    assert_eq!(value, json!({"items": []}));
}

#[tokio::test]
async fn test_transient_failure_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [{"id": 1}]})))
        .expect(1)
        .mount(&server)
        .await;

    let value = transport(&server, 4).get("search", &params("x")).await.unwrap();
    assert_eq!(value["items"][0]["id"], 1);
}

#[tokio::test]
async fn test_fatal_reason_is_not_retried() {
    let server = MockServer::start().await;
    let body = json!({"error": {"code": 400, "errors": [{"reason": "keyInvalid"}]}});
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let err = transport(&server, 4)
        .get("channels", &params("UC1"))
        .await
        .unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(err.reason.as_deref(), Some("keyInvalid"));
    assert_eq!(err.attempts, 1);
}

#[tokio::test]
async fn test_not_found_surfaces_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/playlistItems"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let err = transport(&server, 2)
        .get("playlistItems", &[("playlistId", "UU1".to_string())])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn test_timeout_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"items": []}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let err = transport(&server, 1)
        .get("channels", &params("UC1"))
        .await
        .unwrap_err();
    assert_eq!(err.status, None);
    assert!(err.exception.is_some());
    assert!(!err.to_string().contains(KEY));
}

#[tokio::test]
async fn test_undecodable_body_is_retried_then_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .expect(2)
        .mount(&server)
        .await;

    let err = transport(&server, 2)
        .get("channels", &params("UC1"))
        .await
        .unwrap_err();
    assert_eq!(err.status, Some(200));
    assert!(err.exception.unwrap().starts_with("decode"));
}
