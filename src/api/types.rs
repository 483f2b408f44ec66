// src/api/types.rs

use serde::{Deserialize, Serialize};

use crate::core::message::Role;

/// Request body for POST /api/chat.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<IncomingMessage>,
    #[serde(default)]
    pub model: Option<String>,
}

/// One conversation entry as the client sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub role: Role,
    pub content: String,
}

/// Success response for POST /api/chat.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub content: String,
    pub model: String,
}

/// 429 body for a local-cooldown denial.
#[derive(Debug, Serialize)]
pub struct CooldownDenial {
    pub error: String,
    #[serde(rename = "retryAfter")]
    pub retry_after_ms: u64,
}

/// 429 body for an upstream rate-limit condition.
#[derive(Debug, Serialize)]
pub struct UpstreamDenial {
    pub error: String,
    pub details: UpstreamDenialDetails,
}

#[derive(Debug, Serialize)]
pub struct UpstreamDenialDetails {
    pub message: String,
    pub suggestion: String,
}

/// One selector entry for GET /api/models.
#[derive(Debug, Serialize)]
pub struct ModelEntry {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
