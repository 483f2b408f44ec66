// src/api/handlers.rs

use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::{types::*, ApiState};
use crate::core::limiter::Admission;
use crate::infra::errors::{ChatError, COOLDOWN_TEXT, UPSTREAM_RATE_LIMIT_TEXT};
use crate::provider::ChatMessage;

/// Wire-facing error wrapper: maps the error taxonomy onto status codes,
/// bodies, and Retry-After headers.
pub struct ApiError(pub ChatError);

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            ChatError::InvalidInput => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Invalid messages format".into(),
                }),
            )
                .into_response(),
            ChatError::CooldownActive { retry_after_ms } => (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, "2")],
                Json(CooldownDenial {
                    error: COOLDOWN_TEXT.into(),
                    retry_after_ms,
                }),
            )
                .into_response(),
            ChatError::UpstreamRateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, "60")],
                Json(UpstreamDenial {
                    error: UPSTREAM_RATE_LIMIT_TEXT.into(),
                    details: UpstreamDenialDetails {
                        message: "The API is temporarily unavailable due to high demand.".into(),
                        suggestion: "Wait a few seconds and try again.".into(),
                    },
                }),
            )
                .into_response(),
            e => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.user_message(),
                }),
            )
                .into_response(),
        }
    }
}

/// POST /api/chat — One completion over the posted conversation window.
///
/// Stateless: the client owns its transcript and sends it with every
/// request. The cooldown gate is checked before the body is even looked
/// at, and only a granted request moves the window.
pub async fn chat(
    State(state): State<ApiState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    {
        let mut gate = state.cooldown.lock().unwrap_or_else(|e| e.into_inner());
        if let Admission::Denied { retry_after } = gate.try_acquire(Instant::now()) {
            return Err(ApiError(ChatError::CooldownActive {
                retry_after_ms: retry_after.as_millis() as u64,
            }));
        }
    }

    let Json(request) = payload.map_err(|_| ApiError(ChatError::InvalidInput))?;
    if request.messages.is_empty() {
        return Err(ApiError(ChatError::InvalidInput));
    }

    let history: Vec<ChatMessage> = request
        .messages
        .iter()
        .map(|m| ChatMessage {
            role: m.role,
            content: m.content.clone(),
        })
        .collect();

    let completion = state
        .gateway
        .complete(&history, request.model.as_deref())
        .await?;

    Ok(Json(ChatResponse {
        content: completion.content,
        model: completion.model,
    }))
}

/// GET /api/models — Selector catalog of the providers that came up with
/// credentials at startup.
pub async fn models(State(state): State<ApiState>) -> Json<Vec<ModelEntry>> {
    let entries = state
        .gateway
        .providers()
        .iter()
        .map(|p| ModelEntry {
            id: p.id().to_string(),
            name: p.name().to_string(),
            description: p.description().to_string(),
        })
        .collect();
    Json(entries)
}

/// GET /api/health — Simple health check.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
