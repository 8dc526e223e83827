//! Session Management
//!
//! A session owns the ordered user/assistant history and the agent that
//! answers it. Turns are strictly sequential: one user message in, exactly
//! one assistant message out, or nothing appended when the invocation
//! fails. Resetting replaces the whole session object.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message};
use crate::reasoning::{Agent, AgentFactory, AgentTurn};

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the advisory dialogue stands.
///
/// The protocol itself is carried by the system prompt; this is tracked
/// from what each turn actually did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialoguePhase {
    /// Asking age, income, goal and risk tolerance
    #[default]
    CollectingProfile,
    /// Tools have been used to look up market data
    Researching,
    /// An allocation was given without the disclaimer
    Recommending,
    /// The allocation ended with the disclaimer
    Disclaimed,
    /// Free-form questions after a recommendation
    FollowUp,
}

impl DialoguePhase {
    /// Phase after a successful turn
    pub fn advance(self, turn: &AgentTurn) -> Self {
        if turn.allocation_detected {
            return if turn.disclaimer_present {
                DialoguePhase::Disclaimed
            } else {
                DialoguePhase::Recommending
            };
        }

        match self {
            DialoguePhase::CollectingProfile if !turn.tool_trace.is_empty() => {
                DialoguePhase::Researching
            }
            DialoguePhase::Disclaimed | DialoguePhase::Recommending => DialoguePhase::FollowUp,
            phase => phase,
        }
    }
}

/// Session metadata
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Session title (from the first user message)
    pub title: Option<String>,

    /// Model that produced the latest reply
    pub model: Option<String>,

    /// Extra key-value metadata
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// A chat session
#[derive(Clone, Debug, Serialize)]
pub struct Session {
    /// Unique identifier
    pub id: SessionId,

    /// Conversation history (user and assistant messages only)
    conversation: Conversation,

    /// Dialogue phase
    phase: DialoguePhase,

    /// Session metadata
    pub metadata: SessionMetadata,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last activity timestamp
    pub updated_at: DateTime<Utc>,

    /// Agent answering this session, built lazily
    #[serde(skip)]
    agent: Option<Arc<Agent>>,

    /// Fingerprint of the credentials the agent was built with
    #[serde(skip)]
    agent_fingerprint: Option<String>,

    /// Number of agent constructions over this object's life
    #[serde(skip)]
    agent_builds: usize,
}

impl Session {
    /// Create a new session
    pub fn new() -> Self {
        Self::with_id(SessionId::new())
    }

    /// Create with specific ID
    pub fn with_id(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            conversation: Conversation::new(),
            phase: DialoguePhase::default(),
            metadata: SessionMetadata::default(),
            created_at: now,
            updated_at: now,
            agent: None,
            agent_fingerprint: None,
            agent_builds: 0,
        }
    }

    /// Update the activity timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Ordered user/assistant history
    pub fn history(&self) -> &[Message] {
        self.conversation.messages()
    }

    /// Current dialogue phase
    pub fn phase(&self) -> DialoguePhase {
        self.phase
    }

    /// Message count
    pub fn message_count(&self) -> usize {
        self.conversation.len()
    }

    /// How many times an agent was constructed for this session object
    pub fn agent_builds(&self) -> usize {
        self.agent_builds
    }

    /// Whether an agent is currently attached
    pub fn has_agent(&self) -> bool {
        self.agent.is_some()
    }

    /// Get or generate title
    pub fn title(&self) -> String {
        self.metadata.title.clone().unwrap_or_else(|| {
            self.conversation
                .messages()
                .iter()
                .find(|m| m.role == crate::message::Role::User)
                .map(|m| {
                    let preview: String = m.content.chars().take(50).collect();
                    if m.content.chars().count() > 50 {
                        format!("{}...", preview)
                    } else {
                        preview
                    }
                })
                .unwrap_or_else(|| format!("Session {}", self.id.0.chars().take(8).collect::<String>()))
        })
    }

    /// Discard everything and start over: same id, empty history, first
    /// phase, no agent. The next turn builds a new agent.
    pub fn reset(&mut self) {
        tracing::info!(session = %self.id, "Session reset");
        *self = Session::with_id(self.id.clone());
    }

    /// Return the agent, building it on first use or when credentials
    /// changed. A credential change also clears the history.
    fn ensure_agent(&mut self, factory: &dyn AgentFactory) -> Result<Arc<Agent>> {
        let fingerprint = factory.credential_fingerprint();

        if let (Some(agent), Some(current)) = (&self.agent, &self.agent_fingerprint) {
            if *current == fingerprint {
                return Ok(agent.clone());
            }
        }

        let rebuilding = self.agent.is_some();
        let agent = Arc::new(factory.build()?);

        if rebuilding {
            tracing::info!(session = %self.id, "Credentials changed, rebuilding agent and clearing history");
            self.conversation.clear();
            self.phase = DialoguePhase::default();
        }

        self.agent = Some(agent.clone());
        self.agent_fingerprint = Some(fingerprint);
        self.agent_builds += 1;
        Ok(agent)
    }

    /// Run one user turn.
    ///
    /// On success exactly one assistant message is appended. On failure the
    /// user message stays in the history so the user can retry.
    pub async fn submit(&mut self, factory: &dyn AgentFactory, text: &str) -> Result<AgentTurn> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AgentError::Session("Message must not be empty".into()));
        }

        let agent = self.ensure_agent(factory)?;

        self.conversation.push(Message::user(text));
        if self.metadata.title.is_none() {
            self.metadata.title = Some(self.title());
        }
        self.touch();

        match agent.respond(self.conversation.messages()).await {
            Ok(turn) => {
                self.conversation
                    .push(Message::assistant(turn.reply.clone()).with_model(turn.model.clone()));
                self.phase = self.phase.advance(&turn);
                self.metadata.model = Some(turn.model.clone());
                self.touch();

                tracing::info!(
                    session = %self.id,
                    phase = ?self.phase,
                    tools = turn.tool_trace.len(),
                    iterations = turn.iterations,
                    "Turn completed"
                );
                Ok(turn)
            }
            Err(e) => {
                tracing::error!(session = %self.id, "Turn failed: {}", e);
                Err(e)
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared, turn-serializing handle to a session
pub type SessionHandle = Arc<Mutex<Session>>;

/// Session store trait
pub trait SessionStore: Send + Sync {
    /// Create and register a fresh session
    fn create(&self) -> (SessionId, SessionHandle);

    /// Look up a session by ID
    fn get(&self, id: &SessionId) -> Option<SessionHandle>;

    /// Drop a session
    fn remove(&self, id: &SessionId) -> bool;

    /// Number of live sessions
    fn len(&self) -> usize;

    /// Drop sessions idle for longer than `max_idle`; returns how many
    fn evict_idle(&self, max_idle: Duration) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory session store; sessions end with the process
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn create(&self) -> (SessionId, SessionHandle) {
        let session = Session::new();
        let id = session.id.clone();
        let handle = Arc::new(Mutex::new(session));
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), handle.clone());
        (id, handle)
    }

    fn get(&self, id: &SessionId) -> Option<SessionHandle> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn remove(&self, id: &SessionId) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some()
    }

    fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn evict_idle(&self, max_idle: Duration) -> usize {
        let Some(cutoff) = TimeDelta::from_std(max_idle)
            .ok()
            .and_then(|idle| Utc::now().checked_sub_signed(idle))
        else {
            return 0;
        };

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        // a locked session is mid-turn, never idle
        sessions.retain(|_, handle| {
            handle
                .try_lock()
                .map_or(true, |session| session.updated_at >= cutoff)
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }
}
