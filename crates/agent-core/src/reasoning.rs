//! Reasoning Loop
//!
//! Implements the ReAct (Reason + Act) pattern for agent behavior.
//! Each user turn replays the full history, lets the model call any number
//! of tools, and ends with exactly one final reply.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::allocation::{place_disclaimer, AllocationDetector};
use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message, Role};
use crate::provider::{Completion, GenerationOptions, LlmProvider, TokenUsage};
use crate::tool::{ToolCall, ToolRegistry, ToolResult};

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System prompt
    pub system_prompt: String,

    /// Maximum reasoning iterations before giving up
    pub max_iterations: usize,

    /// Generation options
    pub generation: GenerationOptions,

    /// Append tool descriptions to the system prompt when the provider has
    /// no native function calling
    pub inject_tool_descriptions: bool,

    /// Wall-clock budget for one whole turn, tool calls included
    pub turn_timeout: Duration,

    /// Fixed text every allocation-bearing reply must end with
    pub disclaimer: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_iterations: 10,
            generation: GenerationOptions::default(),
            inject_tool_descriptions: true,
            turn_timeout: Duration::from_secs(120),
            disclaimer: None,
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a helpful AI assistant.

After receiving tool results, synthesize them into a helpful response.
If you can answer directly without tools, do so.
Be concise and accurate."#;

/// One tool call made while answering a turn
#[derive(Clone, Debug, Serialize)]
pub struct ToolInvocation {
    pub name: String,
    pub arguments: HashMap<String, serde_json::Value>,
    pub success: bool,
    pub output: String,
}

/// Outcome of one user turn
#[derive(Clone, Debug, Serialize)]
pub struct AgentTurn {
    /// Final assistant text, disclaimer guard applied
    pub reply: String,

    /// Every tool call made, in execution order
    pub tool_trace: Vec<ToolInvocation>,

    /// Model round-trips used
    pub iterations: usize,

    /// Summed token usage, when the provider reports it
    pub usage: Option<TokenUsage>,

    /// Model that produced the final reply
    pub model: String,

    /// Reply carries a percentage allocation breakdown
    pub allocation_detected: bool,

    /// Reply ends with the configured disclaimer
    pub disclaimer_present: bool,

    /// The disclaimer was missing or misplaced and had to be put at the end
    pub disclaimer_appended: bool,
}

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
    allocation: AllocationDetector,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("model", &self.config.generation.model)
            .field("tools", &self.tools.names())
            .finish_non_exhaustive()
    }
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Result<Self> {
        Ok(Self {
            provider,
            tools,
            config,
            allocation: AllocationDetector::new()?,
        })
    }

    /// Build the full system prompt including tool descriptions
    fn build_system_prompt(&self) -> String {
        let mut prompt = self.config.system_prompt.clone();

        if self.config.inject_tool_descriptions
            && !self.provider.supports_native_tools()
            && !self.tools.is_empty()
        {
            prompt.push_str("\n\n");
            prompt.push_str(&self.tools.generate_prompt_section());
        }

        prompt
    }

    /// Answer the latest user message given the full ordered history.
    ///
    /// The history is not modified; tool traffic stays in a scratch
    /// conversation local to this call.
    pub async fn respond(&self, history: &[Message]) -> Result<AgentTurn> {
        let budget = self.config.turn_timeout;
        match tokio::time::timeout(budget, self.run_loop(history)).await {
            Ok(result) => result,
            Err(_) => Err(AgentError::Timeout(budget)),
        }
    }

    async fn run_loop(&self, history: &[Message]) -> Result<AgentTurn> {
        let mut scratch = Conversation::with_system_prompt(self.build_system_prompt());
        scratch.extend(
            history
                .iter()
                .filter(|m| matches!(m.role, Role::User | Role::Assistant))
                .cloned(),
        );

        let schemas = self.tools.schemas();
        let mut trace = Vec::new();
        let mut usage: Option<TokenUsage> = None;

        for iteration in 1..=self.config.max_iterations {
            let completion = self.provider
                .complete(scratch.messages(), &schemas, &self.config.generation)
                .await?;

            if let Some(u) = &completion.usage {
                usage.get_or_insert_with(TokenUsage::default).add(u);
            }

            let native = !completion.tool_calls.is_empty();
            let calls: Vec<ToolCall> = if native {
                completion.tool_calls.clone()
            } else {
                self.parse_tool_call(&completion.content).into_iter().collect()
            };

            if calls.is_empty() {
                return self.finish(completion, trace, iteration, usage);
            }

            let calls: Vec<ToolCall> = calls
                .into_iter()
                .map(|mut call| {
                    if call.id.is_none() {
                        call.id = Some(uuid::Uuid::new_v4().to_string());
                    }
                    call
                })
                .collect();

            if native {
                scratch.push(Message::assistant_tool_calls(completion.content.clone(), calls.clone()));
            } else {
                scratch.push(Message::assistant(completion.content.clone()));
            }

            // Independent lookups run concurrently; all results are in
            // before the model is asked again.
            let results = join_all(calls.iter().map(|call| self.execute_tool(call))).await;

            for (call, result) in calls.iter().zip(results) {
                tracing::debug!(
                    tool = %call.name,
                    success = result.success,
                    "Tool finished"
                );
                scratch.push(Message::tool(
                    self.format_tool_result(&result),
                    result.name.clone(),
                    call.id.clone(),
                ));
                trace.push(ToolInvocation {
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                    success: result.success,
                    output: result.output,
                });
            }
        }

        Err(AgentError::MaxIterations(self.config.max_iterations))
    }

    fn finish(
        &self,
        completion: Completion,
        tool_trace: Vec<ToolInvocation>,
        iterations: usize,
        usage: Option<TokenUsage>,
    ) -> Result<AgentTurn> {
        let mut reply = completion.content.trim().to_string();
        if reply.is_empty() {
            return Err(AgentError::Provider("Model returned an empty response".into()));
        }

        let allocation_detected = self.allocation.detect(&reply);
        let mut disclaimer_appended = false;

        if let Some(disclaimer) = self.config.disclaimer.as_deref() {
            disclaimer_appended = place_disclaimer(&mut reply, disclaimer, allocation_detected);
            if disclaimer_appended {
                tracing::warn!("Reply did not end with the disclaimer, moved it to the end");
            }
        }

        let disclaimer_present = self.config
            .disclaimer
            .as_deref()
            .is_some_and(|d| reply.ends_with(d));

        Ok(AgentTurn {
            reply,
            tool_trace,
            iterations,
            usage,
            model: completion.model,
            allocation_detected,
            disclaimer_present,
            disclaimer_appended,
        })
    }

    /// Parse a tool call from LLM response text (```tool fenced block)
    fn parse_tool_call(&self, content: &str) -> Option<ToolCall> {
        let tool_start = "```tool";
        let tool_end = "```";

        if let Some(start_idx) = content.find(tool_start) {
            let after_marker = &content[start_idx + tool_start.len()..];
            if let Some(end_idx) = after_marker.find(tool_end) {
                let json_str = after_marker[..end_idx].trim();

                if let Ok(call) = serde_json::from_str::<ToolCall>(json_str) {
                    return Some(call);
                }
                tracing::warn!("Unparseable tool block: {}", json_str);
            }
        }

        None
    }

    /// Execute a tool call; failures become failed results
    async fn execute_tool(&self, call: &ToolCall) -> ToolResult {
        match self.tools.execute(call).await {
            Ok(mut result) => {
                result.id = call.id.clone();
                result
            }
            Err(e) => {
                tracing::warn!(tool = %call.name, "Tool call rejected: {}", e);
                let mut result = ToolResult::failure(call.name.clone(), e.to_string());
                result.id = call.id.clone();
                result
            }
        }
    }

    /// Format tool result for conversation
    fn format_tool_result(&self, result: &ToolResult) -> String {
        if result.success {
            format!("[Tool '{}' returned]\n{}", result.name, result.output)
        } else {
            format!("[Tool '{}' failed]\n{}", result.name, result.output)
        }
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Builds agents for sessions. Sessions rebuild their agent when the
/// credential fingerprint changes.
pub trait AgentFactory: Send + Sync {
    /// Stable digest of the credentials the next `build` would use
    fn credential_fingerprint(&self) -> String;

    /// Construct a fresh agent
    fn build(&self) -> Result<Agent>;
}

/// SHA-256 digest over credential values; the raw keys are never kept
pub fn credential_fingerprint(secrets: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for secret in secrets {
        hasher.update(secret.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool<T: crate::tool::Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn turn_timeout(mut self, timeout: Duration) -> Self {
        self.config.turn_timeout = timeout;
        self
    }

    pub fn disclaimer(mut self, disclaimer: impl Into<String>) -> Self {
        self.config.disclaimer = Some(disclaimer.into());
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self.provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        if self.config.max_iterations == 0 {
            return Err(AgentError::Config("max_iterations must be at least 1".into()));
        }

        Agent::new(provider, Arc::new(self.tools), self.config)
    }
}
