//! Tests for the shared HTTP client against a mock server

use aihub_core::http::{HttpClient, RequestOptions};
use aihub_core::providers::GenerationError;
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_post_json_sends_request_id_and_headers() {
    let server = MockServer::start().await;
    let request_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(header("x-request-id", request_id.to_string().as_str()))
        .and(header("x-custom", "yes"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new().unwrap();
    let options = RequestOptions::new().with_request_id(request_id);
    let body: Value = client
        .post_json(
            "test",
            &format!("{}/echo", server.uri()),
            &[("x-custom", "yes".to_string())],
            &json!({ "q": 1 }),
            &options,
        )
        .await
        .unwrap();

    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn test_non_json_content_type_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html>maintenance</html>", "text/html"),
        )
        .mount(&server)
        .await;

    let client = HttpClient::new().unwrap();
    let err = client
        .post_json::<_, Value>("test", &server.uri(), &[], &json!({}), &RequestOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_oversized_response_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "x".repeat(512) })))
        .mount(&server)
        .await;

    let client = HttpClient::new().unwrap().with_max_response_size(64);
    let err = client
        .post_json::<_, Value>("test", &server.uri(), &[], &json!({}), &RequestOptions::new())
        .await
        .unwrap_err();

    match err {
        GenerationError::MalformedResponse(message) => assert!(message.contains("exceeds maximum")),
        other => panic!("Expected MalformedResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = HttpClient::new().unwrap();
    let options = RequestOptions::new().with_timeout(Duration::from_millis(100));
    let err = client
        .post_json::<_, Value>("test", &server.uri(), &[], &json!({}), &options)
        .await
        .unwrap_err();

    assert_eq!(err, GenerationError::Timeout(Duration::from_millis(100)));
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    // Nothing listens on the discard port locally
    let client = HttpClient::new().unwrap();
    let err = client
        .post_json::<_, Value>(
            "test",
            "http://127.0.0.1:9/v1",
            &[],
            &json!({}),
            &RequestOptions::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::Network(_)));
}

#[tokio::test]
async fn test_invalid_json_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("{not json", "application/json"),
        )
        .mount(&server)
        .await;

    let client = HttpClient::new().unwrap();
    let err = client
        .post_json::<_, Value>("test", &server.uri(), &[], &json!({}), &RequestOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_oversized_error_body_is_not_read() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("x".repeat(4096)))
        .mount(&server)
        .await;

    let client = HttpClient::new().unwrap().with_max_response_size(64);
    let err = client
        .post_json::<_, Value>("test", &server.uri(), &[], &json!({}), &RequestOptions::new())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        GenerationError::ServerError {
            status: 500,
            message: "HTTP error 500".to_string(),
        }
    );
}

#[tokio::test]
async fn test_gateway_timeout_reports_upstream_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(504)
                .set_body_json(json!({ "error": { "message": "upstream deadline exceeded" } })),
        )
        .mount(&server)
        .await;

    let client = HttpClient::new().unwrap();
    let err = client
        .post_json::<_, Value>("test", &server.uri(), &[], &json!({}), &RequestOptions::new())
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Upstream timed out (504): upstream deadline exceeded"
    );
}
