//! HTTP Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agent_core::{
    provider::ModelInfo, AgentError, DialoguePhase, Role, SessionHandle, SessionId, SessionStore,
};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider_connected: bool,
    pub active_sessions: usize,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub phase: DialoguePhase,
}

#[derive(Debug, Serialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub session_id: String,
    pub title: String,
    pub phase: DialoguePhase,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<TranscriptEntry>,
}

#[derive(Debug, Serialize)]
pub struct ReplyResponse {
    pub session_id: String,
    pub reply: String,
    pub phase: DialoguePhase,
    pub tools_used: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn find_session(state: &AppState, id: &str) -> Result<SessionHandle, ApiError> {
    state
        .sessions
        .get(&SessionId::from_string(id))
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "SESSION_NOT_FOUND", "Session not found"))
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider_connected = state.provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider_connected,
        active_sessions: state.sessions.len(),
    })
}

/// Models exposed by the reasoning provider
pub async fn list_models(
    State(state): State<AppState>,
) -> Result<Json<Vec<ModelInfo>>, ApiError> {
    state.provider.list_models().await.map(Json).map_err(|e| {
        tracing::warn!("Model listing failed: {}", e);
        api_error(StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", e.user_message())
    })
}

/// Start a new conversation
pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionResponse>) {
    let (id, handle) = state.sessions.create();
    let phase = handle.lock().await.phase();
    tracing::info!(session = %id, "Session created");

    (
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id: id.to_string(),
            phase,
        }),
    )
}

/// Transcript and phase of a session
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let handle = find_session(&state, &id)?;
    let session = handle.lock().await;

    Ok(Json(TranscriptResponse {
        session_id: session.id.to_string(),
        title: session.title(),
        phase: session.phase(),
        created_at: session.created_at,
        updated_at: session.updated_at,
        messages: session
            .history()
            .iter()
            .map(|m| TranscriptEntry {
                role: m.role.clone(),
                content: m.content.clone(),
                timestamp: m.timestamp,
            })
            .collect(),
    }))
}

/// Run one user turn.
///
/// The session lock is held for the whole turn, so a second message to the
/// same session waits for the first reply.
pub async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<MessageRequest>,
) -> Result<Json<ReplyResponse>, ApiError> {
    let handle = find_session(&state, &id)?;
    let mut session = handle.lock().await;

    match session.submit(state.factory.as_ref(), &payload.message).await {
        Ok(turn) => Ok(Json(ReplyResponse {
            session_id: session.id.to_string(),
            reply: turn.reply,
            phase: session.phase(),
            tools_used: turn.tool_trace.into_iter().map(|t| t.name).collect(),
        })),
        Err(AgentError::Session(msg)) => {
            Err(api_error(StatusCode::BAD_REQUEST, "INVALID_MESSAGE", msg))
        }
        Err(e) => {
            tracing::error!(session = %session.id, "Agent error: {}", e);
            Err(api_error(StatusCode::BAD_GATEWAY, "AGENT_ERROR", e.user_message()))
        }
    }
}

/// Discard the conversation and start over under the same id
pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let handle = find_session(&state, &id)?;
    let mut session = handle.lock().await;
    session.reset();

    Ok(Json(SessionResponse {
        session_id: session.id.to_string(),
        phase: session.phase(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use agent_core::{mock::ScriptedProvider, LlmProvider, MemorySessionStore};
    use axum::{
        body::Body,
        http::{Request, Response},
        Router,
    };
    use invest_advisor::{MockMarketData, StaticSearch};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::AdvisorSettings;
    use crate::factory::AdvisorAgentFactory;

    fn app(provider: ScriptedProvider) -> Router {
        let settings = AdvisorSettings::from_lookup(|key| match key {
            "GEMINI_API_KEY" => Some("gemini-test".into()),
            "EXA_API_KEY" => Some("exa-test".into()),
            _ => None,
        })
        .unwrap();
        let provider: Arc<dyn LlmProvider> = Arc::new(provider);
        let factory = AdvisorAgentFactory::new(
            settings,
            provider.clone(),
            Arc::new(MockMarketData::demo()),
            Arc::new(StaticSearch::default()),
        );

        crate::router(AppState {
            provider,
            sessions: Arc::new(MemorySessionStore::new()),
            factory: Arc::new(factory),
        })
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response<Body> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn new_session(app: &Router) -> String {
        let response = send(app, "POST", "/api/sessions", None).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["phase"], "collecting_profile");
        body["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_turn_round_trip() {
        let app = app(ScriptedProvider::new()
            .then_call("get_gold_price", json!({}))
            .then_reply("Gold is at $243.80. First, how old are you?"));
        let id = new_session(&app).await;

        let response = send(
            &app,
            "POST",
            &format!("/api/sessions/{}/messages", id),
            Some(json!({"message": "Hello"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["session_id"], id.as_str());
        assert_eq!(body["tools_used"], json!(["get_gold_price"]));
        assert_eq!(body["phase"], "researching");

        let transcript = json_body(send(&app, "GET", &format!("/api/sessions/{}", id), None).await).await;
        let messages = transcript["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["role"], "assistant");
    }

    #[tokio::test]
    async fn test_invocation_failure_keeps_user_message() {
        let app = app(ScriptedProvider::new().then_fail("upstream down"));
        let id = new_session(&app).await;

        let response = send(
            &app,
            "POST",
            &format!("/api/sessions/{}/messages", id),
            Some(json!({"message": "I'm 30"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(json_body(response).await["code"], "AGENT_ERROR");

        let transcript = json_body(send(&app, "GET", &format!("/api/sessions/{}", id), None).await).await;
        let messages = transcript["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["content"], "I'm 30");
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let app = app(ScriptedProvider::new());
        let id = new_session(&app).await;

        let response = send(
            &app,
            "POST",
            &format!("/api/sessions/{}/messages", id),
            Some(json!({"message": "   "})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "INVALID_MESSAGE");
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let app = app(ScriptedProvider::new());
        let response = send(&app, "GET", "/api/sessions/does-not-exist", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reset_clears_transcript() {
        let app = app(ScriptedProvider::new().then_reply("How old are you?"));
        let id = new_session(&app).await;

        send(
            &app,
            "POST",
            &format!("/api/sessions/{}/messages", id),
            Some(json!({"message": "Hi"})),
        )
        .await;

        let reset = json_body(send(&app, "POST", &format!("/api/sessions/{}/reset", id), None).await).await;
        assert_eq!(reset["session_id"], id.as_str());
        assert_eq!(reset["phase"], "collecting_profile");

        let transcript = json_body(send(&app, "GET", &format!("/api/sessions/{}", id), None).await).await;
        assert!(transcript["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_health_and_models() {
        let app = app(ScriptedProvider::new());

        let health = json_body(send(&app, "GET", "/health", None).await).await;
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["provider_connected"], true);

        let models = json_body(send(&app, "GET", "/api/models", None).await).await;
        assert_eq!(models[0]["id"], "scripted");
    }
}
