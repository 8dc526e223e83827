//! Application State

use std::sync::Arc;

use agent_core::{AgentFactory, LlmProvider, MemorySessionStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// LLM provider, for health and model listing
    pub provider: Arc<dyn LlmProvider>,

    /// Live chat sessions
    pub sessions: Arc<MemorySessionStore>,

    /// Builds the advisor agent for each session
    pub factory: Arc<dyn AgentFactory>,
}
