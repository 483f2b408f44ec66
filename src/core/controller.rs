// src/core/controller.rs — Per-turn sequencing of store, gate, and gateway
//
// The controller is the only component that drives a full user turn:
// append the user message, consult the cooldown gate, call the gateway,
// append exactly one assistant message for whatever happened. Failed and
// denied turns still land the transcript in a settled state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::debug;

use super::limiter::{Admission, CooldownGate};
use super::message::{Message, MessageDraft};
use super::persist::SharedStore;
use crate::infra::errors::{ChatError, COOLDOWN_TEXT};
use crate::provider::gateway::CompletionGateway;
use crate::provider::ChatMessage;

/// Both messages appended by one settled turn.
#[derive(Debug, Clone)]
pub struct Turn {
    pub user: Message,
    pub assistant: Message,
}

pub struct ChatController {
    store: SharedStore,
    gateway: Arc<CompletionGateway>,
    cooldown: Mutex<CooldownGate>,
    in_flight: AtomicBool,
}

impl ChatController {
    pub fn new(store: SharedStore, gateway: Arc<CompletionGateway>, cooldown: CooldownGate) -> Self {
        Self {
            store,
            gateway,
            cooldown: Mutex::new(cooldown),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn gateway(&self) -> &Arc<CompletionGateway> {
        &self.gateway
    }

    /// Run one user turn to completion.
    ///
    /// Empty input and an already-running turn are rejected outright with
    /// nothing appended. Every accepted turn appends the user message plus
    /// exactly one assistant message (a real reply, or fixed rate-limit or
    /// failure copy), and leaves the loading flag cleared.
    pub async fn submit(&self, text: &str, selector: Option<&str>) -> Result<Turn, ChatError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ChatError::InvalidInput);
        }

        // One turn at a time; a second submission is rejected, not queued.
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(ChatError::TurnInProgress);
        }

        let outcome = self.run_turn(trimmed, selector).await;
        self.store.set_loading(false);
        self.in_flight.store(false, Ordering::SeqCst);
        outcome
    }

    async fn run_turn(&self, text: &str, selector: Option<&str>) -> Result<Turn, ChatError> {
        let user = self.store.add_message(MessageDraft::user(text))?;
        self.store.set_loading(true);

        let admission = {
            let mut gate = self.cooldown.lock().unwrap_or_else(|e| e.into_inner());
            gate.try_acquire(Instant::now())
        };

        if let Admission::Denied { retry_after } = admission {
            let retry_ms = retry_after.as_millis() as u64;
            debug!("Cooldown denied turn, {retry_ms}ms remaining");
            let assistant = self
                .store
                .add_message(MessageDraft::assistant(COOLDOWN_TEXT, None))?;
            self.store
                .set_error(Some(format!("{COOLDOWN_TEXT} (retry in {retry_ms}ms)")));
            return Ok(Turn { user, assistant });
        }

        let history: Vec<ChatMessage> = self
            .store
            .current_session()
            .map(|s| {
                s.messages
                    .iter()
                    .map(|m| ChatMessage {
                        role: m.role,
                        content: m.content.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        match self.gateway.complete(&history, selector).await {
            Ok(completion) => {
                let content = strip_asterisks(&completion.content);
                let assistant = self
                    .store
                    .add_message(MessageDraft::assistant(content, Some(completion.model)))?;
                Ok(Turn { user, assistant })
            }
            Err(e) => {
                debug!("Turn failed: {e}");
                let assistant = self
                    .store
                    .add_message(MessageDraft::assistant(e.user_message(), None))?;
                self.store.set_error(Some(e.to_string()));
                Ok(Turn { user, assistant })
            }
        }
    }
}

/// Display rule carried over from the web client: literal `*` characters
/// are dropped from assistant replies.
fn strip_asterisks(content: &str) -> String {
    content.replace('*', "")
}
