// src/infra/errors.rs — Error types for chatx

use thiserror::Error;

/// Generic fallback shown when an upstream failure carries no usable text.
pub const GENERIC_FAILURE_TEXT: &str = "Sorry, I encountered an error. Please try again.";

/// Fixed copy for a local-cooldown denial.
pub const COOLDOWN_TEXT: &str = "Please wait a moment before sending another message";

/// Fixed copy for an upstream rate-limit condition.
pub const UPSTREAM_RATE_LIMIT_TEXT: &str = "Rate limit exceeded. Please try again in a moment.";

#[derive(Error, Debug)]
pub enum ChatError {
    // Request-shape errors
    #[error("Invalid messages format")]
    InvalidInput,

    // Recoverable by waiting (local gate)
    #[error("{COOLDOWN_TEXT}")]
    CooldownActive { retry_after_ms: u64 },

    // Recoverable by waiting longer (provider gate)
    #[error("Rate limited by '{provider}', retry after {retry_after_ms}ms")]
    UpstreamRateLimited {
        provider: String,
        retry_after_ms: u64,
    },

    // Provider errors
    #[error("Empty response from '{provider}'")]
    EmptyResponse { provider: String },

    #[error("Provider '{provider}' error: {message}")]
    Provider { provider: String, message: String },

    // Store errors
    #[error("No active session")]
    NoActiveSession,

    // Controller errors
    #[error("A completion request is already in flight")]
    TurnInProgress,

    // Startup
    #[error("Missing {env_var} environment variable for provider '{provider}'")]
    MissingCredential { provider: String, env_var: String },

    // Infra
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChatError {
    /// True for conditions a caller recovers from by waiting and resubmitting.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ChatError::CooldownActive { .. } | ChatError::UpstreamRateLimited { .. }
        )
    }

    /// Text appended to the transcript when a turn ends in this error.
    ///
    /// Rate-limit conditions get fixed copy; anything else surfaces its own
    /// message, falling back to the generic line when there is none useful.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::CooldownActive { .. } => COOLDOWN_TEXT.to_string(),
            ChatError::UpstreamRateLimited { .. } => UPSTREAM_RATE_LIMIT_TEXT.to_string(),
            ChatError::Provider { message, .. } if message.trim().is_empty() => {
                GENERIC_FAILURE_TEXT.to_string()
            }
            ChatError::Provider { message, .. } => {
                format!("Failed to generate response: {message}")
            }
            ChatError::EmptyResponse { .. } => format!("Failed to generate response: {self}"),
            _ => GENERIC_FAILURE_TEXT.to_string(),
        }
    }
}
