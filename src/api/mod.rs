// src/api/mod.rs — HTTP API server for browser clients

pub mod handlers;
pub mod types;

use axum::routing::{get, post};
use axum::Router;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use crate::core::limiter::CooldownGate;
use crate::infra::config::ServerConfig;
use crate::provider::gateway::CompletionGateway;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub gateway: Arc<CompletionGateway>,
    /// Process-wide request gate — one slot per cooldown interval,
    /// regardless of which client asks.
    pub cooldown: Arc<Mutex<CooldownGate>>,
}

impl ApiState {
    pub fn new(gateway: Arc<CompletionGateway>, cooldown: CooldownGate) -> Self {
        Self {
            gateway,
            cooldown: Arc::new(Mutex::new(cooldown)),
        }
    }
}

/// Build the axum router with all API routes.
pub fn build_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            "http://localhost:3000".parse().unwrap(),
            "http://localhost:5173".parse().unwrap(),
            "http://127.0.0.1:3000".parse().unwrap(),
            "http://127.0.0.1:5173".parse().unwrap(),
        ])
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/api/chat", post(handlers::chat))
        .route("/api/models", get(handlers::models))
        .route("/api/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}

/// Start the API server on the configured address (blocking).
pub async fn start_server(config: &ServerConfig, state: ApiState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.bind, config.port);

    let router = build_router(state);

    tracing::info!("chat API listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
