//! Conversation engine: central coordinator from customer message to reply.
//!
//! Each message runs through a fixed chain: two-operand arithmetic, the topic
//! gate, retrieval with an answer threshold, and finally the generator with a
//! local fallback. Every message that passes validation records exactly one
//! user turn and one assistant turn.

use std::sync::Arc;
use std::time::Duration;

use concierge_core::config::{ChatConfig, GeneratorConfig, RetrievalConfig};
use concierge_core::ConciergeConfig;
use concierge_retrieval::{compose, RelevanceScorer, Retrieval, SignalWeights};
use tracing::{debug, info, warn};

use crate::arithmetic;
use crate::business::BusinessContext;
use crate::catalog::KnowledgeStore;
use crate::error::ChatError;
use crate::generator::Generator;
use crate::replies;
use crate::session::SessionStore;
use crate::topic_gate::{AllowReason, TopicDecision, TopicGate};
use crate::types::{
    AnswerDebug, AnswerResponse, CompletionRequest, EngineStats, PromptMessage, ResponsePath,
    SessionSummary, Turn,
};

/// Answers customer messages for any business in a [`KnowledgeStore`].
pub struct ConversationEngine {
    store: Arc<dyn KnowledgeStore>,
    generator: Arc<dyn Generator>,
    sessions: SessionStore,
    scorer: RelevanceScorer,
    gate: TopicGate,
    retrieval: RetrievalConfig,
    chat: ChatConfig,
    generation: GeneratorConfig,
}

impl ConversationEngine {
    /// Create an engine from configuration and its two collaborators.
    pub fn new(
        config: &ConciergeConfig,
        store: Arc<dyn KnowledgeStore>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            store,
            generator,
            sessions: SessionStore::new(config.chat.effective_history_turns()),
            scorer: RelevanceScorer::new(SignalWeights::default(), config.retrieval.tie_epsilon),
            gate: TopicGate,
            retrieval: config.retrieval.clone(),
            chat: config.chat.clone(),
            generation: config.generator.clone(),
        }
    }

    /// Answer `message` for the business `business_id` in `session_id`.
    pub async fn answer(
        &self,
        message: &str,
        business_id: &str,
        session_id: &str,
    ) -> Result<AnswerResponse, ChatError> {
        self.validate(message)?;
        let business = self.business(business_id).await?;
        self.answer_with_context(message, &business, session_id).await
    }

    /// Answer `message` against an already-loaded business context.
    pub async fn answer_with_context(
        &self,
        message: &str,
        business: &BusinessContext,
        session_id: &str,
    ) -> Result<AnswerResponse, ChatError> {
        self.validate(message)?;
        let message = message.trim();

        let is_new = self.sessions.is_new(session_id)?;
        let prior = self
            .sessions
            .recent(session_id, self.chat.effective_prompt_turns().saturating_sub(1))?;

        let (response, diag) = self.route(message, business, !is_new, &prior).await;
        self.sessions.append_exchange(session_id, message, &response)?;

        info!(
            business = %business.profile.id,
            session = session_id,
            path = ?diag.path,
            contexts = diag.context_found,
            max_score = diag.max_score,
            "Message answered"
        );

        Ok(AnswerResponse {
            response,
            is_new_conversation: is_new,
            initial_message: is_new.then(|| business.initial_greeting.clone()),
            suggestions: if business.show_suggestions {
                replies::suggestions(message)
            } else {
                Vec::new()
            },
            debug: diag,
        })
    }

    /// Retained history for a session, oldest first.
    pub fn history(&self, session_id: &str) -> Result<Vec<Turn>, ChatError> {
        self.sessions.history(session_id)
    }

    /// Forget one session, or all of them. Returns how many were removed.
    pub fn clear_history(&self, session_id: Option<&str>) -> Result<usize, ChatError> {
        let removed = self.sessions.clear(session_id)?;
        info!(session = ?session_id, removed, "Conversation history cleared");
        Ok(removed)
    }

    /// Summaries of every session with history.
    pub fn sessions(&self) -> Result<Vec<SessionSummary>, ChatError> {
        self.sessions.summaries()
    }

    pub fn stats(&self) -> Result<EngineStats, ChatError> {
        Ok(EngineStats {
            active_sessions: self.sessions.len()?,
            generator_available: self.generator.is_available(),
            model: self.generator.model().to_string(),
            max_tokens: self.generation.max_tokens,
        })
    }

    /// Score every knowledge entry of a business against `query`, with no
    /// threshold. For diagnosing why a question did or did not match.
    pub async fn explain(&self, business_id: &str, query: &str) -> Result<Retrieval, ChatError> {
        let business = self.business(business_id).await?;
        Ok(self.scorer.explain(query, &business.knowledge))
    }

    // -- Private helpers --

    fn validate(&self, message: &str) -> Result<(), ChatError> {
        if !self.chat.enabled {
            return Err(ChatError::Disabled);
        }
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if message.chars().count() > self.chat.max_message_length {
            return Err(ChatError::MessageTooLong(self.chat.max_message_length));
        }
        Ok(())
    }

    async fn business(&self, business_id: &str) -> Result<Arc<BusinessContext>, ChatError> {
        self.store
            .load_business_context(business_id)
            .await?
            .ok_or_else(|| ChatError::BusinessNotFound(business_id.to_string()))
    }

    /// Pick the reply for a validated message. Never fails: every error past
    /// validation ends in a local reply.
    async fn route(
        &self,
        message: &str,
        business: &BusinessContext,
        in_conversation: bool,
        prior: &[Turn],
    ) -> (String, AnswerDebug) {
        // 1. Arithmetic
        if let Some(reply) = arithmetic::evaluate(message) {
            return (reply, AnswerDebug::without_retrieval(ResponsePath::Arithmetic));
        }

        // 2. Topic gate
        let reason = match self.gate.classify(message, business, in_conversation) {
            TopicDecision::Deny => {
                debug!(business = %business.profile.id, "Message redirected as off-topic");
                let reply = self.gate.redirect_message(message, business.display_name());
                return (reply, AnswerDebug::without_retrieval(ResponsePath::OffTopic));
            }
            TopicDecision::Allow(reason) => reason,
        };

        // 3. Retrieval
        let retrieval = self.scorer.retrieve(
            message,
            &business.knowledge,
            self.retrieval.top_k,
            self.retrieval.similarity_threshold,
        );
        let mut diag = AnswerDebug {
            context_found: retrieval.contexts.len(),
            max_score: retrieval.max_score,
            path: ResponsePath::NoContext,
            was_normalized: retrieval.normalization.altered(),
            original_language: retrieval
                .normalization
                .note
                .as_ref()
                .map(|n| n.original_language.clone()),
        };

        // The generator only ever sees grounded messages. A bare pleasantry
        // gets the local greeting instead.
        if retrieval.max_score < self.retrieval.answer_threshold {
            debug!(
                max_score = retrieval.max_score,
                threshold = self.retrieval.answer_threshold,
                reason = ?reason,
                "No knowledge entry relevant enough"
            );
            if reason == AllowReason::ConversationStarter {
                diag.path = ResponsePath::Greeting;
                return (replies::starter_reply(business), diag);
            }
            return (replies::no_context_reply(business), diag);
        }

        // 4. Generation
        let request = self.build_request(message, business, &retrieval, prior);
        let timeout = Duration::from_secs(self.generation.timeout_secs);
        let outcome = match tokio::time::timeout(timeout, self.generator.complete(&request)).await {
            Ok(result) => result,
            Err(_) => Err(ChatError::Upstream(format!(
                "generator timed out after {}s",
                self.generation.timeout_secs
            ))),
        };

        match outcome.map(|text| text.trim().to_string()) {
            Ok(text) if !text.is_empty() => {
                diag.path = ResponsePath::Generated;
                (text, diag)
            }
            Ok(_) => {
                warn!(
                    business = %business.profile.id,
                    "Generator returned empty text; using fallback"
                );
                diag.path = ResponsePath::Fallback;
                (self.fallback(business, &retrieval), diag)
            }
            Err(e) => {
                warn!(
                    business = %business.profile.id,
                    error = %e,
                    "Generator failed; using fallback"
                );
                diag.path = ResponsePath::Fallback;
                (self.fallback(business, &retrieval), diag)
            }
        }
    }

    fn build_request(
        &self,
        message: &str,
        business: &BusinessContext,
        retrieval: &Retrieval,
        prior: &[Turn],
    ) -> CompletionRequest {
        let mut messages = vec![PromptMessage::system(&business.system_instructions)];
        if let Some(context) = compose(
            &retrieval.contexts,
            &business.knowledge,
            retrieval.normalization.note.as_ref(),
        ) {
            messages.push(PromptMessage::system(context));
        }
        messages.extend(prior.iter().map(PromptMessage::from));
        messages.push(PromptMessage::user(message));

        CompletionRequest {
            messages,
            max_tokens: self.generation.max_tokens,
            temperature: self.generation.temperature,
            top_p: self.generation.top_p,
        }
    }

    fn fallback(&self, business: &BusinessContext, retrieval: &Retrieval) -> String {
        let best = retrieval
            .contexts
            .first()
            .and_then(|m| business.knowledge.entry(m.entry_index))
            .map(|e| e.answer.as_str());
        replies::fallback_reply(business, best)
    }
}

// =============================================================================
// Tests
// =============================================================================
