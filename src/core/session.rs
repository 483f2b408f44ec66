// src/core/session.rs — Chat session: a named, ordered message thread

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::{Message, MessageDraft};

/// Name given to the very first session a store creates.
pub const DEFAULT_SESSION_NAME: &str = "default";

/// Name given to sessions synthesized when a delete would leave none current.
pub const RECOVERY_SESSION_NAME: &str = "New Chat";

/// Label for explicitly created sessions.
pub fn timestamp_name(now: DateTime<Utc>) -> String {
    format!("Chat {}", now.format("%Y-%m-%d %H:%M"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub name: String,
    pub messages: Vec<Message>,
    pub created: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl Session {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            messages: Vec::new(),
            created: now,
            last_updated: now,
        }
    }

    /// Append a message, assigning a fresh id and timestamp.
    ///
    /// Timestamps within a session never decrease: a backwards wall-clock
    /// step is clamped to the previous message's timestamp.
    pub fn append(&mut self, draft: MessageDraft) -> &Message {
        let mut timestamp = Utc::now();
        if let Some(last) = self.messages.last() {
            timestamp = timestamp.max(last.timestamp);
        }

        self.messages.push(Message {
            id: Uuid::new_v4().to_string(),
            role: draft.role,
            content: draft.content,
            timestamp,
            model: draft.model,
        });
        self.last_updated = timestamp;

        self.messages.last().expect("just pushed")
    }

    /// Truncate the transcript, keeping the session itself.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.last_updated = Utc::now();
    }
}
