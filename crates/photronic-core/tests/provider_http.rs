#![allow(unused_crate_dependencies)]
#![allow(clippy::tests_outside_test_module, reason = "integration tests live in tests/ dir")]
#![allow(clippy::unwrap_used, clippy::expect_used, reason = "integration test: panics are the assertion mechanism")]

use std::time::Duration;

use photronic_core::provider::{ChatProvider, ProviderAdapter, ProviderRequest, RequestTurn};
use photronic_core::types::models::ProviderKind;
use photronic_core::types::{LlmConfig, ProviderError, Role};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> ProviderRequest {
    ProviderRequest {
        system_instruction: "rules".to_string(),
        scene_summary: "(the canvas is empty)".to_string(),
        turns: vec![RequestTurn { role: Role::User, content: "Hi".to_string() }],
    }
}

fn gemini_config(server: &MockServer, api_key: &str, timeout_secs: u64) -> LlmConfig {
    let mut config = LlmConfig::default();
    config.gemini.api_key = api_key.to_string();
    config.gemini.base_url = server.uri();
    config.timeout_secs = timeout_secs;
    config
}

fn openai_config(server: &MockServer, api_key: &str) -> LlmConfig {
    let mut config = LlmConfig::default();
    config.switch_to(ProviderKind::OpenAiCompatible);
    config.openai.api_key = api_key.to_string();
    config.openai.endpoint = format!("{}/api/v1", server.uri());
    config.openai.model = "test-model".to_string();
    config
}

fn gemini_success_body() -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {"parts": [{"text": "Hello "}, {"text": "from mock!"}], "role": "model"},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4, "totalTokenCount": 16}
    })
}

#[tokio::test]
async fn test_gemini_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(header("x-goog-api-key", "g-key"))
        .and(body_partial_json(serde_json::json!({
            "contents": [{"role": "user", "parts": [{"text": "Hi"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_success_body()))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = ProviderAdapter::from_config(&gemini_config(&server, "g-key", 30)).unwrap();
    let response = adapter.complete(&request(), &CancellationToken::new()).await.unwrap();

    assert_eq!(response.text, "Hello from mock!");
    assert_eq!(response.model, "gemini-2.5-flash");
    assert_eq!(response.usage.map(|u| u.total_tokens), Some(16));
}

#[tokio::test]
async fn test_gemini_server_error_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let adapter = ProviderAdapter::from_config(&gemini_config(&server, "g-key", 30)).unwrap();
    let err = adapter.complete(&request(), &CancellationToken::new()).await.unwrap_err();

    match err {
        ProviderError::Unavailable { provider, status, message } => {
            assert_eq!(provider, "Gemini");
            assert_eq!(status, Some(500));
            assert!(message.contains("Internal Server Error"), "message: {}", message);
        },
        other => panic!("expected Unavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_gemini_blocked_prompt_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .mount(&server)
        .await;

    let adapter = ProviderAdapter::from_config(&gemini_config(&server, "g-key", 30)).unwrap();
    let err = adapter.complete(&request(), &CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Unavailable { ref message, .. } if message.contains("SAFETY")));
}

#[tokio::test]
async fn test_gemini_missing_key_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_success_body()))
        .expect(0)
        .mount(&server)
        .await;

    let adapter = ProviderAdapter::from_config(&gemini_config(&server, "  ", 30)).unwrap();
    let err = adapter.complete(&request(), &CancellationToken::new()).await.unwrap_err();
    assert_eq!(
        err,
        ProviderError::MissingCredential { provider: "Gemini".into(), field: "API key".into() }
    );
}

#[tokio::test]
async fn test_gemini_slow_reply_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_success_body())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let adapter = ProviderAdapter::from_config(&gemini_config(&server, "g-key", 1)).unwrap();
    let err = adapter.complete(&request(), &CancellationToken::new()).await.unwrap_err();
    assert_eq!(err, ProviderError::Timeout { provider: "Gemini".into(), duration_secs: 1 });
}

#[tokio::test]
async fn test_cancellation_aborts_in_flight_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_success_body())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let adapter = ProviderAdapter::from_config(&gemini_config(&server, "g-key", 30)).unwrap();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = adapter.complete(&request(), &cancel).await.unwrap_err();
    assert_eq!(err, ProviderError::Cancelled);
}

#[tokio::test]
async fn test_openai_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("authorization", "Bearer o-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-model",
            "messages": [{"role": "system"}, {"role": "user", "content": "Hi"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-1",
            "model": "test-model",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Done."}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 9, "completion_tokens": 2, "total_tokens": 11}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = ProviderAdapter::from_config(&openai_config(&server, "o-key")).unwrap();
    let response = adapter.complete(&request(), &CancellationToken::new()).await.unwrap();

    assert_eq!(response.text, "Done.");
    assert_eq!(response.usage.map(|u| u.prompt_tokens), Some(9));
}

#[tokio::test]
async fn test_openai_unauthorized_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"message": "Invalid API key"}
        })))
        .mount(&server)
        .await;

    let adapter = ProviderAdapter::from_config(&openai_config(&server, "wrong")).unwrap();
    let err = adapter.complete(&request(), &CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, ProviderError::Unavailable { status: Some(401), .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_openai_empty_choices_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&server)
        .await;

    let adapter = ProviderAdapter::from_config(&openai_config(&server, "o-key")).unwrap();
    let err = adapter.complete(&request(), &CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Unavailable { status: Some(200), .. }));
}

#[tokio::test]
async fn test_openai_missing_key() {
    let server = MockServer::start().await;
    let adapter = ProviderAdapter::from_config(&openai_config(&server, "")).unwrap();
    let err = adapter.complete(&request(), &CancellationToken::new()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "OpenAI-compatible API key is not set. Please configure it in the settings."
    );
}
