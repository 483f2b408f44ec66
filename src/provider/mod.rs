// src/provider/mod.rs — Completion provider layer

pub mod gateway;
pub mod gemini;
pub mod groq;

use async_trait::async_trait;

use crate::core::message::Role;
use crate::infra::errors::ChatError;

/// One entry of the upstream conversation window.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub system: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
}

/// Core trait both upstream providers implement. One request, one response;
/// no streaming, no retries.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Selector id ("groq", "gemini").
    fn id(&self) -> &str;
    /// Human-readable name for the model catalog.
    fn name(&self) -> &str;
    /// One-line description for the model catalog.
    fn description(&self) -> &str;
    /// Upstream model id used when the request doesn't override it.
    fn default_model(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ChatError>;
}
