//! Scripted Provider
//!
//! Deterministic `LlmProvider` for tests and offline demos. Each call to
//! `complete` consumes the next scripted step and records the messages it
//! was given.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{
    Completion, FinishReason, GenerationOptions, LlmProvider, ModelInfo,
};
use crate::tool::{ToolCall, ToolSchema};

/// One scripted model response
#[derive(Clone, Debug)]
pub enum ScriptStep {
    /// Final text
    Reply(String),
    /// Native tool calls
    Calls(Vec<ToolCall>),
    /// Provider failure
    Fail(String),
    /// Sleep, then reply
    Stall(Duration, String),
}

/// Provider that plays back a fixed script
pub struct ScriptedProvider {
    steps: Mutex<VecDeque<ScriptStep>>,
    requests: Mutex<Vec<Vec<Message>>>,
    native_tools: bool,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedProvider {
    /// Script with native tool calling
    pub fn new() -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            native_tools: true,
        }
    }

    /// Script for a provider that only speaks text (```tool blocks)
    pub fn text_protocol() -> Self {
        Self {
            native_tools: false,
            ..Self::new()
        }
    }

    fn push(self, step: ScriptStep) -> Self {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(step);
        self
    }

    pub fn then_reply(self, text: impl Into<String>) -> Self {
        self.push(ScriptStep::Reply(text.into()))
    }

    pub fn then_call(self, name: impl Into<String>, arguments: serde_json::Value) -> Self {
        let mut call = ToolCall::new(name);
        if let serde_json::Value::Object(map) = arguments {
            call.arguments = map.into_iter().collect();
        }
        self.push(ScriptStep::Calls(vec![call]))
    }

    pub fn then_calls(self, calls: Vec<ToolCall>) -> Self {
        self.push(ScriptStep::Calls(calls))
    }

    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.push(ScriptStep::Fail(message.into()))
    }

    pub fn then_stall(self, delay: Duration, text: impl Into<String>) -> Self {
        self.push(ScriptStep::Stall(delay, text.into()))
    }

    /// Messages received by each `complete` call, oldest first
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Steps not yet consumed
    pub fn remaining(&self) -> usize {
        self.steps.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn text_completion(text: String, model: &str) -> Completion {
        Completion {
            content: text,
            model: model.to_string(),
            finish_reason: Some(FinishReason::Stop),
            ..Default::default()
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn complete(
        &self,
        messages: &[Message],
        _tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(messages.to_vec());

        let step = self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| AgentError::Provider("Script exhausted".into()))?;

        match step {
            ScriptStep::Reply(text) => Ok(Self::text_completion(text, &options.model)),
            ScriptStep::Calls(calls) => Ok(Completion {
                tool_calls: calls,
                model: options.model.clone(),
                finish_reason: Some(FinishReason::ToolUse),
                ..Default::default()
            }),
            ScriptStep::Fail(message) => Err(AgentError::ProviderUnavailable(message)),
            ScriptStep::Stall(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(Self::text_completion(text, &options.model))
            }
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(vec![ModelInfo {
            id: "scripted".into(),
            name: "Scripted".into(),
            context_length: None,
        }])
    }

    fn supports_native_tools(&self) -> bool {
        self.native_tools
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_plays_in_order() {
        let provider = ScriptedProvider::new().then_reply("one").then_fail("down");
        let opts = GenerationOptions::default();

        let first = provider.complete(&[Message::user("a")], &[], &opts).await.unwrap();
        assert_eq!(first.content, "one");
        assert!(provider.complete(&[], &[], &opts).await.is_err());
        assert!(provider.complete(&[], &[], &opts).await.is_err());
        assert_eq!(provider.requests().len(), 3);
        assert_eq!(provider.remaining(), 0);
    }
}
