//! Gemini LLM Provider
//!
//! Implementation of `LlmProvider` over the Generative Language REST API
//! (`models/{model}:generateContent`) with native function calling.

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{
        Completion, FinishReason, GenerationOptions, LlmProvider, ModelInfo, TokenUsage,
    },
    tool::{ToolCall, ToolSchema},
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini provider configuration
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key (sent as `x-goog-api-key`)
    pub api_key: String,

    /// API root, without trailing slash
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: 90,
        }
    }

    /// Read `GEMINI_API_KEY` (required) and `GEMINI_BASE_URL` (optional)
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AgentError::Config("GEMINI_API_KEY is not set".into()))?;

        let mut config = Self::new(api_key.trim());
        if let Ok(url) = std::env::var("GEMINI_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        Ok(config)
    }
}

/// Gemini LLM provider
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create from configuration
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AgentError::Config("Gemini API key is empty".into()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    /// Convert agent messages to Gemini contents.
    ///
    /// System messages become the system instruction. Consecutive tool
    /// results are grouped into one user turn of function responses.
    fn convert_messages(messages: &[Message]) -> (Option<Content>, Vec<Content>) {
        let mut system_parts = Vec::new();
        let mut contents: Vec<Content> = Vec::new();

        for m in messages {
            match m.role {
                Role::System => system_parts.push(Part::text(&m.content)),
                Role::User => contents.push(Content::new("user", vec![Part::text(&m.content)])),
                Role::Assistant => {
                    let mut parts = Vec::new();
                    if !m.content.is_empty() {
                        parts.push(Part::text(&m.content));
                    }
                    for call in m.tool_calls() {
                        parts.push(Part {
                            function_call: Some(FunctionCall {
                                name: call.name.clone(),
                                args: serde_json::Value::Object(
                                    call.arguments.clone().into_iter().collect(),
                                ),
                                id: call.id.clone(),
                            }),
                            ..Default::default()
                        });
                    }
                    if !parts.is_empty() {
                        contents.push(Content::new("model", parts));
                    }
                }
                Role::Tool => {
                    let part = Part {
                        function_response: Some(FunctionResponse {
                            name: m.tool_name().unwrap_or("tool").to_string(),
                            response: json!({ "content": m.content }),
                            id: m.metadata.as_ref().and_then(|md| md.tool_call_id.clone()),
                        }),
                        ..Default::default()
                    };

                    match contents.last_mut() {
                        Some(last) if last.is_function_responses() => last.parts.push(part),
                        _ => contents.push(Content::new("user", vec![part])),
                    }
                }
            }
        }

        let system = (!system_parts.is_empty()).then(|| Content {
            role: None,
            parts: system_parts,
        });

        (system, contents)
    }

    /// Convert tool schemas to function declarations
    fn convert_tools(schemas: &[ToolSchema]) -> Vec<ToolDeclarations> {
        if schemas.is_empty() {
            return Vec::new();
        }

        let function_declarations = schemas
            .iter()
            .map(|schema| {
                let parameters = (!schema.parameters.is_empty()).then(|| {
                    let properties: serde_json::Map<String, serde_json::Value> = schema
                        .parameters
                        .iter()
                        .map(|p| {
                            (
                                p.name.clone(),
                                json!({ "type": p.param_type, "description": p.description }),
                            )
                        })
                        .collect();
                    let required: Vec<&str> = schema
                        .parameters
                        .iter()
                        .filter(|p| p.required)
                        .map(|p| p.name.as_str())
                        .collect();
                    json!({ "type": "object", "properties": properties, "required": required })
                });

                FunctionDeclaration {
                    name: schema.name.clone(),
                    description: schema.description.clone(),
                    parameters,
                }
            })
            .collect();

        vec![ToolDeclarations { function_declarations }]
    }

    /// Convert a Gemini response to an agent completion
    fn convert_completion(response: GenerateContentResponse, model: &str) -> Result<Completion> {
        let candidate = match response.candidates.into_iter().next() {
            Some(c) => c,
            None => {
                let reason = response
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .unwrap_or_else(|| "no candidates returned".into());
                return Err(AgentError::Provider(format!("Gemini returned no answer: {}", reason)));
            }
        };

        let mut content = String::new();
        let mut tool_calls = Vec::new();

        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if part.thought == Some(true) {
                continue;
            }
            if let Some(text) = part.text {
                content.push_str(&text);
            }
            if let Some(call) = part.function_call {
                let arguments = match call.args {
                    serde_json::Value::Object(map) => map.into_iter().collect(),
                    _ => Default::default(),
                };
                tool_calls.push(ToolCall {
                    name: call.name,
                    arguments,
                    id: call.id,
                });
            }
        }

        let finish_reason = if tool_calls.is_empty() {
            candidate.finish_reason.as_deref().map(map_finish_reason)
        } else {
            Some(FinishReason::ToolUse)
        };

        Ok(Completion {
            content,
            tool_calls,
            model: response.model_version.unwrap_or_else(|| model.to_string()),
            usage: response.usage_metadata.map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count.unwrap_or(0),
                completion_tokens: u.candidates_token_count.unwrap_or(0),
                total_tokens: u.total_token_count.unwrap_or(0),
            }),
            truncated: finish_reason == Some(FinishReason::Length),
            finish_reason,
        })
    }

    /// Build Gemini generation options
    fn build_options(opts: &GenerationOptions) -> GenerationConfig {
        GenerationConfig {
            temperature: opts.temperature,
            top_p: opts.top_p,
            max_output_tokens: opts.max_tokens,
            stop_sequences: opts.stop_sequences.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }
}

fn map_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::Length,
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII" => {
            FinishReason::ContentFilter
        }
        _ => FinishReason::Error,
    }
}

/// Map an HTTP failure to the agent error taxonomy
fn map_status(status: StatusCode, body: &str) -> AgentError {
    let message = serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.chars().take(300).collect());

    match status {
        StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(message),
        s if s.is_server_error() => AgentError::ProviderUnavailable(message),
        _ => AgentError::Provider(format!("{}: {}", status, message)),
    }
}

fn map_transport(err: reqwest::Error) -> AgentError {
    if err.is_timeout() || err.is_connect() {
        AgentError::ProviderUnavailable(err.to_string())
    } else {
        AgentError::Provider(err.to_string())
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn health_check(&self) -> Result<bool> {
        match self.list_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Gemini health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let (system_instruction, contents) = Self::convert_messages(messages);

        let request = GenerateContentRequest {
            contents,
            system_instruction,
            tools: Self::convert_tools(tools),
            generation_config: Self::build_options(options),
        };

        tracing::debug!(model = %options.model, messages = messages.len(), "Calling Gemini");

        let response = self.client
            .post(self.url(&format!("models/{}:generateContent", options.model)))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Gemini API error {}: {}", status, body);
            return Err(map_status(status, &body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Parse(format!("Gemini response: {}", e)))?;

        Self::convert_completion(parsed, &options.model)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let response = self.client
            .get(self.url("models"))
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, &body));
        }

        let list: ModelList = response
            .json()
            .await
            .map_err(|e| AgentError::Parse(format!("Gemini model list: {}", e)))?;

        Ok(list
            .models
            .into_iter()
            .filter(|m| m.supported_generation_methods.iter().any(|g| g == "generateContent"))
            .map(|m| {
                let id = m.name.trim_start_matches("models/").to_string();
                ModelInfo {
                    name: m.display_name.unwrap_or_else(|| id.clone()),
                    id,
                    context_length: m.input_token_limit,
                }
            })
            .collect())
    }

    fn supports_native_tools(&self) -> bool {
        true
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDeclarations>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn new(role: &str, parts: Vec<Part>) -> Self {
        Self {
            role: Some(role.into()),
            parts,
        }
    }

    fn is_function_responses(&self) -> bool {
        self.role.as_deref() == Some("user")
            && !self.parts.is_empty()
            && self.parts.iter().all(|p| p.function_response.is_some())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolDeclarations {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop_sequences: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
    total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<RemoteModel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteModel {
    name: String,
    display_name: Option<String>,
    input_token_limit: Option<u32>,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}
