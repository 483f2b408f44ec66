// src/provider/gateway.rs — Selector routing, history window, system prompt
//
// One gateway call is one upstream call: no retries, no fallback chains.
// The gateway owns everything the providers shouldn't care about — which
// provider a selector means, how much history to send, and the fixed
// assistant persona.

use std::sync::Arc;

use tracing::debug;

use super::{ChatMessage, CompletionProvider, CompletionRequest};
use crate::infra::config::ChatConfig;
use crate::infra::errors::ChatError;

/// Persona sent with every upstream request unless overridden in config.
pub const SYSTEM_PROMPT: &str = "You are a helpful and knowledgeable AI assistant. You provide clear, accurate, and engaging responses while maintaining a professional and friendly tone.";

/// Normalized result of one completion call.
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    /// Upstream model id the call actually used.
    pub model: String,
}

pub struct CompletionGateway {
    providers: Vec<Arc<dyn CompletionProvider>>,
    primary: String,
    system_prompt: String,
    history_window: usize,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

impl CompletionGateway {
    pub fn new(providers: Vec<Arc<dyn CompletionProvider>>, chat: &ChatConfig) -> Self {
        Self {
            providers,
            primary: chat.default_model.clone(),
            system_prompt: chat
                .system_prompt
                .clone()
                .unwrap_or_else(|| SYSTEM_PROMPT.to_string()),
            history_window: chat.history_window,
            max_tokens: chat.max_tokens,
            temperature: chat.temperature,
            top_p: chat.top_p,
        }
    }

    /// Registered providers, in registration order.
    pub fn providers(&self) -> &[Arc<dyn CompletionProvider>] {
        &self.providers
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// Send the recent conversation window upstream and normalize the reply.
    ///
    /// An unknown or missing selector routes to the primary provider.
    /// A reply with no usable text is an `EmptyResponse` error.
    pub async fn complete(
        &self,
        history: &[ChatMessage],
        selector: Option<&str>,
    ) -> Result<Completion, ChatError> {
        let provider = self
            .resolve(selector)
            .ok_or_else(|| ChatError::Config("no completion providers configured".into()))?;

        let window = tail_window(history, self.history_window);
        let messages = window.to_vec();

        let model = provider.default_model().to_string();
        debug!(
            "Requesting completion from '{}' ({} of {} messages)",
            provider.id(),
            window.len(),
            history.len()
        );

        let request = CompletionRequest {
            model: model.clone(),
            messages,
            system: Some(self.system_prompt.clone()),
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
            top_p: Some(self.top_p),
        };

        let response = provider.complete(request).await?;
        if response.content.trim().is_empty() {
            return Err(ChatError::EmptyResponse {
                provider: provider.id().to_string(),
            });
        }

        Ok(Completion {
            content: response.content,
            model,
        })
    }

    fn resolve(&self, selector: Option<&str>) -> Option<&Arc<dyn CompletionProvider>> {
        selector
            .and_then(|s| self.find(s))
            .or_else(|| self.find(&self.primary))
            .or_else(|| self.providers.first())
    }

    fn find(&self, id: &str) -> Option<&Arc<dyn CompletionProvider>> {
        self.providers.iter().find(|p| p.id() == id)
    }
}

fn tail_window(history: &[ChatMessage], n: usize) -> &[ChatMessage] {
    &history[history.len().saturating_sub(n)..]
}
