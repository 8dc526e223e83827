//! # agent-core
//!
//! Core agent logic with provider-agnostic LLM abstraction, a static tool
//! registry and turn-based chat sessions.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Session (history, phase)                                    │
//! │  ┌─────────────────────────────────────────────────────────┐ │
//! │  │                        Agent                             │ │
//! │  │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────┐  │ │
//! │  │  │  Reasoning  │  │    Tools    │  │   LlmProvider   │  │ │
//! │  │  │    Loop     │──│   Registry  │──│   (Strategy)    │  │ │
//! │  │  └─────────────┘  └─────────────┘  └─────────────────┘  │ │
//! │  └─────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each user turn replays the whole history through the agent and appends
//! exactly one assistant reply.

pub mod allocation;
pub mod provider;
pub mod tool;
pub mod reasoning;
pub mod message;
pub mod error;
pub mod session;
pub mod mock;

pub use error::{AgentError, Result};
pub use message::{Conversation, Message, Role};
pub use provider::LlmProvider;
pub use reasoning::{Agent, AgentBuilder, AgentFactory, AgentTurn, ToolInvocation};
pub use session::{DialoguePhase, MemorySessionStore, Session, SessionHandle, SessionId, SessionStore};
pub use tool::{Tool, ToolCall, ToolResult, ToolRegistry, ToolSchema};
