//! API Client

use serde::{Deserialize, Serialize};

/// Chat message for display
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub phase: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Transcript {
    pub session_id: String,
    pub phase: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Reply {
    pub reply: String,
    pub phase: String,
    #[serde(default)]
    pub tools_used: Vec<String>,
}

/// Absolute URL for an API path, relative to the page origin
fn endpoint(path: &str) -> String {
    let origin = web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_else(|| "http://localhost:3000".into());
    format!("{}{}", origin, path)
}

async fn error_text(response: reqwest::Response) -> String {
    let data: serde_json::Value = response.json().await.unwrap_or_default();
    data["error"].as_str().unwrap_or("Request failed").to_string()
}

/// Start a new conversation
pub async fn create_session() -> Result<SessionInfo, String> {
    let response = reqwest::Client::new()
        .post(endpoint("/api/sessions"))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if response.status().is_success() {
        response.json().await.map_err(|e| e.to_string())
    } else {
        Err(error_text(response).await)
    }
}

/// Load an existing conversation
pub async fn fetch_transcript(session_id: &str) -> Result<Transcript, String> {
    let response = reqwest::Client::new()
        .get(endpoint(&format!("/api/sessions/{}", session_id)))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if response.status().is_success() {
        response.json().await.map_err(|e| e.to_string())
    } else {
        Err(error_text(response).await)
    }
}

/// Send one user message and wait for the assistant reply
pub async fn send_message(session_id: &str, message: &str) -> Result<Reply, String> {
    let response = reqwest::Client::new()
        .post(endpoint(&format!("/api/sessions/{}/messages", session_id)))
        .json(&serde_json::json!({ "message": message }))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if response.status().is_success() {
        response.json().await.map_err(|e| e.to_string())
    } else {
        Err(error_text(response).await)
    }
}

/// Discard the conversation on the server
pub async fn reset_session(session_id: &str) -> Result<SessionInfo, String> {
    let response = reqwest::Client::new()
        .post(endpoint(&format!("/api/sessions/{}/reset", session_id)))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if response.status().is_success() {
        response.json().await.map_err(|e| e.to_string())
    } else {
        Err(error_text(response).await)
    }
}

/// Human label for a dialogue phase
pub fn phase_label(phase: &str) -> &'static str {
    match phase {
        "collecting_profile" => "Getting to know you",
        "researching" => "Researching the market",
        "recommending" | "disclaimed" => "Recommendation ready",
        "follow_up" => "Follow-up questions",
        _ => "",
    }
}
