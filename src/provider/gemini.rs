// src/provider/gemini.rs — Google Generative AI (Gemini) provider

use async_trait::async_trait;

use super::{CompletionProvider, CompletionRequest, CompletionResponse};
use crate::core::message::Role;
use crate::infra::errors::ChatError;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, ChatError> {
        match std::env::var("GEMINI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key)),
            _ => Err(ChatError::MissingCredential {
                provider: "gemini".into(),
                env_var: "GEMINI_API_KEY".into(),
            }),
        }
    }

    /// Build the generateContent request body.
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut contents: Vec<serde_json::Value> = Vec::new();
        for m in &request.messages {
            let role = match m.role {
                Role::User => "user",
                Role::Assistant => "model",
                Role::System => continue, // system handled via system_instruction
            };
            contents.push(serde_json::json!({
                "role": role,
                "parts": [{ "text": m.content }],
            }));
        }

        let mut body = serde_json::json!({
            "contents": contents,
        });

        if let Some(system) = &request.system {
            body["system_instruction"] = serde_json::json!({
                "parts": [{ "text": system }],
            });
        }

        let mut gen_config = serde_json::json!({});
        if let Some(max_tokens) = request.max_tokens {
            gen_config["maxOutputTokens"] = serde_json::json!(max_tokens);
        }
        if let Some(temp) = request.temperature {
            gen_config["temperature"] = serde_json::json!(temp);
        }
        if let Some(top_p) = request.top_p {
            gen_config["topP"] = serde_json::json!(top_p);
        }
        if gen_config != serde_json::json!({}) {
            body["generationConfig"] = gen_config;
        }

        body
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    fn id(&self) -> &str {
        "gemini"
    }

    fn name(&self) -> &str {
        "Gemini 1.5 flash"
    }

    fn description(&self) -> &str {
        "Google's advanced AI model"
    }

    fn default_model(&self) -> &str {
        DEFAULT_MODEL
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ChatError> {
        let body = self.build_request_body(&request);

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, request.model, self.api_key,
        );

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Provider {
                provider: "gemini".into(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ChatError::UpstreamRateLimited {
                provider: "gemini".into(),
                retry_after_ms: 60_000,
            });
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ChatError::Provider {
                provider: "gemini".into(),
                message: format!("HTTP {status}: {error_body}"),
            });
        }

        let resp: serde_json::Value = response.json().await.map_err(|e| ChatError::Provider {
            provider: "gemini".into(),
            message: format!("Failed to parse response: {e}"),
        })?;

        // Concatenate text from candidates[0].content.parts
        let parts = resp["candidates"][0]["content"]["parts"]
            .as_array()
            .cloned()
            .unwrap_or_default();

        let mut content = String::new();
        for part in &parts {
            if let Some(text) = part["text"].as_str() {
                content.push_str(text);
            }
        }

        Ok(CompletionResponse { content })
    }
}
