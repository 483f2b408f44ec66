// tests/chat_api_test.rs — Integration test: HTTP chat API with mock provider

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use chatx::api::{build_router, ApiState};
use chatx::core::limiter::CooldownGate;
use chatx::infra::config::ChatConfig;
use chatx::infra::errors::ChatError;
use chatx::provider::gateway::CompletionGateway;
use chatx::provider::{CompletionProvider, CompletionRequest, CompletionResponse};

/// A mock provider that returns canned responses without making any network calls.
struct MockProvider {
    reply: Result<&'static str, fn() -> ChatError>,
}

impl MockProvider {
    fn replying(reply: &'static str) -> Arc<Self> {
        Arc::new(Self { reply: Ok(reply) })
    }

    fn failing(make: fn() -> ChatError) -> Arc<Self> {
        Arc::new(Self { reply: Err(make) })
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn id(&self) -> &str {
        "groq"
    }

    fn name(&self) -> &str {
        "Llama 3.3 70B"
    }

    fn description(&self) -> &str {
        "Versatile large language model"
    }

    fn default_model(&self) -> &str {
        "llama-3.3-70b-versatile"
    }

    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> Result<CompletionResponse, ChatError> {
        match &self.reply {
            Ok(text) => Ok(CompletionResponse {
                content: text.to_string(),
            }),
            Err(make) => Err(make()),
        }
    }
}

fn state_with(provider: Arc<MockProvider>, cooldown_ms: u64) -> ApiState {
    let providers: Vec<Arc<dyn CompletionProvider>> = vec![provider];
    let gateway = Arc::new(CompletionGateway::new(providers, &ChatConfig::default()));
    ApiState::new(gateway, CooldownGate::from_millis(cooldown_ms))
}

fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_chat_returns_content_and_model() {
    let app = build_router(state_with(MockProvider::replying("hi there"), 0));
    let resp = app
        .oneshot(chat_request(
            r#"{"messages": [{"role": "user", "content": "hello"}]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["content"], "hi there");
    assert_eq!(json["model"], "llama-3.3-70b-versatile");
}

#[tokio::test]
async fn test_chat_model_selector_accepted() {
    let app = build_router(state_with(MockProvider::replying("ok"), 0));
    let resp = app
        .oneshot(chat_request(
            r#"{"messages": [{"role": "user", "content": "hi"}], "model": "groq"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_chat_missing_messages_is_400() {
    let app = build_router(state_with(MockProvider::replying("ok"), 0));
    let resp = app.oneshot(chat_request(r#"{}"#)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let json = body_json(resp).await;
    assert_eq!(json["error"], "Invalid messages format");
}

#[tokio::test]
async fn test_chat_empty_messages_is_400() {
    let app = build_router(state_with(MockProvider::replying("ok"), 0));
    let resp = app
        .oneshot(chat_request(r#"{"messages": []}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_malformed_body_is_400() {
    let app = build_router(state_with(MockProvider::replying("ok"), 0));
    let resp = app
        .oneshot(chat_request(r#"{"messages": "not a list"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let json = body_json(resp).await;
    assert_eq!(json["error"], "Invalid messages format");
}

#[tokio::test]
async fn test_chat_cooldown_denial_is_429_with_retry_hint() {
    let app = build_router(state_with(MockProvider::replying("ok"), 2000));
    let body = r#"{"messages": [{"role": "user", "content": "hello"}]}"#;

    let first = app.clone().oneshot(chat_request(body)).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.oneshot(chat_request(body)).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(second.headers().get(header::RETRY_AFTER).unwrap(), "2");

    let json = body_json(second).await;
    assert_eq!(
        json["error"],
        "Please wait a moment before sending another message"
    );
    let retry_after = json["retryAfter"].as_u64().unwrap();
    assert!(retry_after > 0 && retry_after <= 2000);
}

#[tokio::test]
async fn test_cooldown_applies_before_body_validation() {
    // A malformed body still consumes nothing: the gate is consulted first,
    // so a denied request reports 429, not 400.
    let app = build_router(state_with(MockProvider::replying("ok"), 2000));

    let first = app
        .clone()
        .oneshot(chat_request(
            r#"{"messages": [{"role": "user", "content": "hello"}]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.oneshot(chat_request(r#"{}"#)).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_chat_upstream_rate_limit_is_429_with_details() {
    let app = build_router(state_with(
        MockProvider::failing(|| ChatError::UpstreamRateLimited {
            provider: "groq".into(),
            retry_after_ms: 60_000,
        }),
        0,
    ));
    let resp = app
        .oneshot(chat_request(
            r#"{"messages": [{"role": "user", "content": "hello"}]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(resp.headers().get(header::RETRY_AFTER).unwrap(), "60");

    let json = body_json(resp).await;
    assert_eq!(
        json["error"],
        "Rate limit exceeded. Please try again in a moment."
    );
    assert_eq!(
        json["details"]["message"],
        "The API is temporarily unavailable due to high demand."
    );
    assert_eq!(
        json["details"]["suggestion"],
        "Wait a few seconds and try again."
    );
}

#[tokio::test]
async fn test_chat_provider_failure_is_500_with_message() {
    let app = build_router(state_with(
        MockProvider::failing(|| ChatError::Provider {
            provider: "groq".into(),
            message: "connection reset".into(),
        }),
        0,
    ));
    let resp = app
        .oneshot(chat_request(
            r#"{"messages": [{"role": "user", "content": "hello"}]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(resp).await;
    assert_eq!(
        json["error"],
        "Failed to generate response: connection reset"
    );
}

#[tokio::test]
async fn test_chat_empty_upstream_reply_is_500() {
    let app = build_router(state_with(MockProvider::replying(""), 0));
    let resp = app
        .oneshot(chat_request(
            r#"{"messages": [{"role": "user", "content": "hello"}]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(resp).await;
    assert_eq!(
        json["error"],
        "Failed to generate response: Empty response from 'groq'"
    );
}

#[tokio::test]
async fn test_models_endpoint_lists_configured_providers() {
    let app = build_router(state_with(MockProvider::replying("ok"), 0));
    let req = Request::builder()
        .uri("/api/models")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json[0]["id"], "groq");
    assert_eq!(json[0]["name"], "Llama 3.3 70B");
    assert_eq!(json[0]["description"], "Versatile large language model");
}

#[tokio::test]
async fn test_health_reports_ok_and_version() {
    let app = build_router(state_with(MockProvider::replying("ok"), 0));
    let req = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}
