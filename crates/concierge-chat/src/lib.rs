//! Conversation engine for Concierge.
//!
//! Turns a customer message into a reply for one business: local arithmetic,
//! a topic gate, knowledge retrieval, and generation with local fallbacks.
//! Conversation history is kept in memory per session.

pub mod arithmetic;
pub mod business;
pub mod catalog;
pub mod error;
pub mod generator;
pub mod orchestrator;
pub mod replies;
pub mod session;
pub mod topic_gate;
pub mod types;

pub use business::BusinessContext;
pub use catalog::{BusinessCatalog, BusinessSummary, KnowledgeStore};
pub use error::ChatError;
pub use generator::{DisabledGenerator, Generator, HttpGenerator};
pub use orchestrator::ConversationEngine;
pub use session::SessionStore;
pub use topic_gate::{AllowReason, TopicDecision, TopicGate};
pub use types::{
    AnswerDebug, AnswerResponse, CompletionRequest, EngineStats, PromptMessage, ResponsePath,
    Role, SessionHistory, SessionSummary, Turn,
};
