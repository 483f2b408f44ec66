// src/provider/groq.rs — Groq provider (OpenAI-compatible chat completions)

use async_trait::async_trait;

use super::{CompletionProvider, CompletionRequest, CompletionResponse};
use crate::core::message::Role;
use crate::infra::errors::ChatError;

const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

pub struct GroqProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GroqProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: GROQ_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, ChatError> {
        match std::env::var("GROQ_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key)),
            _ => Err(ChatError::MissingCredential {
                provider: "groq".into(),
                env_var: "GROQ_API_KEY".into(),
            }),
        }
    }

    /// Build the chat-completions request body.
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut messages: Vec<serde_json::Value> = Vec::new();
        if let Some(system) = &request.system {
            messages.push(serde_json::json!({"role": "system", "content": system}));
        }
        for m in &request.messages {
            messages.push(serde_json::json!({
                "role": match m.role {
                    Role::System => "system",
                    Role::User => "user",
                    Role::Assistant => "assistant",
                },
                "content": m.content,
            }));
        }

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": messages,
            "stream": false,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        if let Some(top_p) = request.top_p {
            body["top_p"] = serde_json::json!(top_p);
        }
        body
    }
}

/// Groq reports quota exhaustion as HTTP 429, but some SDK-level failures
/// surface only as an error string mentioning the condition.
fn is_rate_limit_signal(status: reqwest::StatusCode, body: &str) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || body.contains("429")
        || body.to_lowercase().contains("rate limit")
}

#[async_trait]
impl CompletionProvider for GroqProvider {
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
        DEFAULT_MODEL
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ChatError> {
        let body = self.build_request_body(&request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Provider {
                provider: "groq".into(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            if is_rate_limit_signal(status, &error_body) {
                return Err(ChatError::UpstreamRateLimited {
                    provider: "groq".into(),
                    retry_after_ms: 60_000,
                });
            }
            return Err(ChatError::Provider {
                provider: "groq".into(),
                message: format!("HTTP {status}: {error_body}"),
            });
        }

        let resp: serde_json::Value = response.json().await.map_err(|e| ChatError::Provider {
            provider: "groq".into(),
            message: format!("Failed to parse response: {e}"),
        })?;

        let content = resp["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();

        Ok(CompletionResponse { content })
    }
}
