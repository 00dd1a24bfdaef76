//! Tests for the OpenAI-compatible provider against a mock server

use aihub_core::config::ProviderConfig;
use aihub_core::http::HttpClient;
use aihub_core::protocol::Prompt;
use aihub_core::providers::openai::{OpenAICompatibleProvider, SamplingOptions};
use aihub_core::providers::{GenerationError, Provider, ProviderType, RoutingBuilder};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: serde_json::Value) -> serde_json::Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn provider_for(server: &MockServer, provider_type: ProviderType) -> OpenAICompatibleProvider {
    let config = ProviderConfig::new(provider_type)
        .with_api_key("sk-test-1234567890")
        .with_base_url(server.uri());
    OpenAICompatibleProvider::from_config(&config, HttpClient::new().unwrap()).unwrap()
}

#[tokio::test]
async fn test_deepseek_request_shape_and_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test-1234567890"))
        .and(body_partial_json(json!({
            "model": "deepseek-chat",
            "messages": [{ "role": "user", "content": "What is AI?" }],
            "temperature": 0.7
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!("AI is..."))))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server, ProviderType::DeepSeek);
    let prompt = Prompt::parse("What is AI?").unwrap();

    assert_eq!(provider.name(), "DeepSeek");
    assert_eq!(provider.generate_text(&prompt, Uuid::new_v4()).await.unwrap(), "AI is...");
}

#[tokio::test]
async fn test_openai_sends_max_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "model": "gpt-3.5-turbo", "max_tokens": 500 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!("ok"))))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server, ProviderType::OpenAI);
    let prompt = Prompt::parse("hi").unwrap();

    assert_eq!(provider.generate_text(&prompt, Uuid::new_v4()).await.unwrap(), "ok");
}

#[test]
fn test_sampling_defaults_per_type() {
    assert_eq!(SamplingOptions::for_type(ProviderType::OpenAI).max_tokens, Some(500));
    assert_eq!(SamplingOptions::for_type(ProviderType::Groq).temperature, Some(0.7));
    assert_eq!(SamplingOptions::for_type(ProviderType::DeepSeek).max_tokens, None);
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Invalid API key", "type": "invalid_request_error" }
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server, ProviderType::Groq);
    let err = provider
        .generate_text(&Prompt::parse("hi").unwrap(), Uuid::new_v4())
        .await
        .unwrap_err();

    assert_eq!(err, GenerationError::Authentication("Invalid API key".to_string()));
}

#[tokio::test]
async fn test_missing_choices_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let provider = provider_for(&server, ProviderType::DeepSeek);
    let err = provider
        .generate_text(&Prompt::parse("hi").unwrap(), Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_null_content_falls_back_as_empty_response() {
    let deepseek = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!(null))))
        .mount(&deepseek)
        .await;

    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!("from openai"))))
        .mount(&openai)
        .await;

    let router = RoutingBuilder::new()
        .provider(Box::new(provider_for(&deepseek, ProviderType::DeepSeek)))
        .provider(Box::new(provider_for(&openai, ProviderType::OpenAI)))
        .build()
        .unwrap();

    let outcome = router.route("hi").await.unwrap();

    assert_eq!(outcome.provider, "OpenAI");
    assert_eq!(outcome.response.as_deref(), Some("from openai"));
    assert_eq!(outcome.errors["DeepSeek"], "Empty response received");
}

#[tokio::test]
async fn test_server_error_then_success_through_router() {
    let failing = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": { "message": "overloaded" }
        })))
        .expect(1)
        .mount(&failing)
        .await;

    let healthy = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!("fine"))))
        .expect(1)
        .mount(&healthy)
        .await;

    let router = RoutingBuilder::new()
        .provider(Box::new(provider_for(&failing, ProviderType::DeepSeek)))
        .provider(Box::new(provider_for(&healthy, ProviderType::Groq)))
        .build()
        .unwrap();

    let outcome = router.route("hi").await.unwrap();

    assert_eq!(outcome.provider, "Groq");
    assert_eq!(outcome.errors["DeepSeek"], "Server error (503): overloaded");
}

#[tokio::test]
async fn test_upstream_sees_routed_request_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!("traced"))))
        .expect(1)
        .mount(&server)
        .await;

    let router = RoutingBuilder::new()
        .provider(Box::new(provider_for(&server, ProviderType::OpenAI)))
        .build()
        .unwrap();

    let outcome = router.route("hi").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let sent = requests[0].headers.get("x-request-id").unwrap();
    assert_eq!(sent.to_str().unwrap(), outcome.request_id.to_string());
}
