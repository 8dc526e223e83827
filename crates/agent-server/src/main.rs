//! Investment Assistant HTTP Server
//!
//! Axum-based server exposing chat sessions backed by the investment
//! advisor agent, plus the static WASM frontend.

mod config;
mod factory;
mod handlers;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::{get, post}, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{LlmProvider, MemorySessionStore, SessionStore};

use crate::config::{AdvisorSettings, REMEDIATION};
use crate::factory::AdvisorAgentFactory;
use crate::handlers::{
    create_session, get_session, health_check, list_models, post_message, reset_session,
};
use crate::state::AppState;

/// Routes, CORS and request tracing around the application state
pub(crate) fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/models", get(list_models))

        // Chat sessions
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session))
        .route("/api/sessions/{id}/messages", post(post_message))
        .route("/api/sessions/{id}/reset", post(reset_session))

        // Static files (WASM frontend)
        .fallback_service(ServeDir::new("static"))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Periodically drop sessions nobody has touched for `ttl`
fn start_session_sweeper(sessions: Arc<MemorySessionStore>, ttl: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(ttl.min(Duration::from_secs(60)));
        loop {
            interval.tick().await;
            sessions.evict_idle(ttl);
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = match AdvisorSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("🛑 {}", e);
            tracing::error!("{}", REMEDIATION);
            return Err(e.into());
        }
    };
    tracing::info!(?settings, "Configuration loaded");

    let bind_addr = settings.bind_addr.clone();
    let session_ttl = settings.session_ttl;
    let factory = AdvisorAgentFactory::from_settings(settings)?;
    let provider = factory.provider();

    // Verify Gemini connection
    match provider.health_check().await {
        Ok(true) => {
            tracing::info!("✓ Connected to Gemini");
            if let Ok(models) = provider.list_models().await {
                tracing::debug!("{} models available", models.len());
            }
        }
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Gemini not reachable - turns will fail until it is");
            tracing::warn!("  Check GEMINI_API_KEY and network access");
        }
    }

    let sessions = Arc::new(MemorySessionStore::new());
    start_session_sweeper(sessions.clone(), session_ttl);

    let state = AppState {
        provider,
        sessions,
        factory: Arc::new(factory),
    };

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 investment assistant running on http://{}", bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                      - Health check");
    tracing::info!("  GET  /api/models                  - List available models");
    tracing::info!("  POST /api/sessions                - Start a conversation");
    tracing::info!("  GET  /api/sessions/{{id}}           - Transcript and phase");
    tracing::info!("  POST /api/sessions/{{id}}/messages  - Send message");
    tracing::info!("  POST /api/sessions/{{id}}/reset     - Reset conversation");
    tracing::info!("");

    axum::serve(listener, router(state)).await?;

    Ok(())
}
