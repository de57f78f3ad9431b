//! Data types for the conversation engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Conversation history
// =============================================================================

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in a session's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub at: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            at: Utc::now(),
        }
    }
}

/// Ordered turns for one session plus activity timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionHistory {
    pub turns: Vec<Turn>,
    pub started_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

impl SessionHistory {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            turns: Vec::new(),
            started_at: now,
            last_active_at: now,
        }
    }
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Lightweight view of a session for listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub turns: usize,
    pub started_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

// =============================================================================
// Answers
// =============================================================================

/// Which branch of the answer chain produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponsePath {
    /// Two-operand arithmetic answered locally.
    Arithmetic,
    /// Topic gate redirected the customer back to the business.
    OffTopic,
    /// Weakly grounded pleasantry answered with the local greeting.
    Greeting,
    /// Nothing in the knowledge base was relevant enough.
    NoContext,
    /// The generator produced the reply.
    Generated,
    /// The generator failed and a local template was used.
    Fallback,
}

/// Diagnostics returned alongside every answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerDebug {
    /// Number of knowledge entries passed to the composer.
    pub context_found: usize,
    /// Best relevance score over the whole knowledge base.
    pub max_score: f64,
    pub path: ResponsePath,
    pub was_normalized: bool,
    pub original_language: Option<String>,
}

impl AnswerDebug {
    /// Debug record for a reply that never reached retrieval.
    pub fn without_retrieval(path: ResponsePath) -> Self {
        Self {
            context_found: 0,
            max_score: 0.0,
            path,
            was_normalized: false,
            original_language: None,
        }
    }
}

/// The engine's reply to one customer message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerResponse {
    pub response: String,
    /// True when the session had no history before this message.
    pub is_new_conversation: bool,
    /// The business greeting, present only for new conversations.
    pub initial_message: Option<String>,
    /// Follow-up prompts; empty when the business turned them off.
    pub suggestions: Vec<String>,
    pub debug: AnswerDebug,
}

/// Engine-wide counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStats {
    pub active_sessions: usize,
    pub generator_available: bool,
    pub model: String,
    pub max_tokens: u32,
}

// =============================================================================
// Generator wire types
// =============================================================================

/// One message in a completion prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

impl From<&Turn> for PromptMessage {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role,
            content: turn.content.clone(),
        }
    }
}

/// Everything a generator needs for one completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub messages: Vec<PromptMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

// =============================================================================
// Tests
// =============================================================================
