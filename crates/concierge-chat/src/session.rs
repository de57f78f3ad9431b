//! In-memory conversation history, keyed by caller-chosen session id.
//!
//! Each session keeps at most `max_turns` turns. An exchange (user message
//! plus assistant reply) is appended under a single lock acquisition, so a
//! session always alternates user / assistant even when requests for the
//! same session overlap.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::debug;

use crate::error::ChatError;
use crate::types::{Role, SessionHistory, SessionSummary, Turn};

/// Thread-safe store of per-session turn histories.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionHistory>>,
    max_turns: usize,
}

impl SessionStore {
    /// Create an empty store that keeps the last `max_turns` turns per session.
    pub fn new(max_turns: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_turns,
        }
    }

    /// Whether `session_id` has no recorded turns yet.
    pub fn is_new(&self, session_id: &str) -> Result<bool, ChatError> {
        let sessions = self.lock()?;
        Ok(sessions.get(session_id).map_or(true, |h| h.turns.is_empty()))
    }

    /// Full retained history for a session, oldest first. Unknown sessions
    /// have an empty history.
    pub fn history(&self, session_id: &str) -> Result<Vec<Turn>, ChatError> {
        let sessions = self.lock()?;
        Ok(sessions
            .get(session_id)
            .map(|h| h.turns.clone())
            .unwrap_or_default())
    }

    /// The last `limit` turns of a session, oldest first.
    pub fn recent(&self, session_id: &str, limit: usize) -> Result<Vec<Turn>, ChatError> {
        let sessions = self.lock()?;
        Ok(sessions
            .get(session_id)
            .map(|h| {
                let start = h.turns.len().saturating_sub(limit);
                h.turns[start..].to_vec()
            })
            .unwrap_or_default())
    }

    /// Record a user message and the assistant's reply as one unit.
    pub fn append_exchange(
        &self,
        session_id: &str,
        user_message: &str,
        assistant_reply: &str,
    ) -> Result<(), ChatError> {
        let mut sessions = self.lock()?;
        let history = sessions.entry(session_id.to_string()).or_default();
        history.turns.push(Turn::new(Role::User, user_message));
        history.turns.push(Turn::new(Role::Assistant, assistant_reply));
        history.last_active_at = Utc::now();
        self.trim(history);
        debug!(
            session = session_id,
            turns = history.turns.len(),
            "Exchange recorded"
        );
        Ok(())
    }

    /// Record a single turn. Callers are responsible for alternation.
    pub fn append_turn(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
    ) -> Result<(), ChatError> {
        let mut sessions = self.lock()?;
        let history = sessions.entry(session_id.to_string()).or_default();
        history.turns.push(Turn::new(role, content));
        history.last_active_at = Utc::now();
        self.trim(history);
        Ok(())
    }

    /// Forget one session, or every session when `session_id` is `None`.
    ///
    /// Returns the number of sessions removed.
    pub fn clear(&self, session_id: Option<&str>) -> Result<usize, ChatError> {
        let mut sessions = self.lock()?;
        let removed = match session_id {
            Some(id) => usize::from(sessions.remove(id).is_some()),
            None => {
                let n = sessions.len();
                sessions.clear();
                n
            }
        };
        debug!(session = ?session_id, removed, "Session history cleared");
        Ok(removed)
    }

    /// Number of sessions with recorded history.
    pub fn len(&self) -> Result<usize, ChatError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, ChatError> {
        Ok(self.lock()?.is_empty())
    }

    /// Summaries of every session, most recently active first.
    pub fn summaries(&self) -> Result<Vec<SessionSummary>, ChatError> {
        let sessions = self.lock()?;
        let mut list: Vec<SessionSummary> = sessions
            .iter()
            .map(|(id, h)| SessionSummary {
                session_id: id.clone(),
                turns: h.turns.len(),
                started_at: h.started_at,
                last_active_at: h.last_active_at,
            })
            .collect();
        list.sort_by(|a, b| {
            b.last_active_at
                .cmp(&a.last_active_at)
                .then_with(|| a.session_id.cmp(&b.session_id))
        });
        Ok(list)
    }

    // -- Private helpers --

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, SessionHistory>>, ChatError> {
        self.sessions
            .lock()
            .map_err(|e| ChatError::StorageError(format!("session lock poisoned: {}", e)))
    }

    /// Drop the oldest turns beyond the cap, then any leading assistant turn
    /// so retained history still starts with the user.
    fn trim(&self, history: &mut SessionHistory) {
        let excess = history.turns.len().saturating_sub(self.max_turns);
        if excess > 0 {
            history.turns.drain(..excess);
        }
        while history
            .turns
            .first()
            .is_some_and(|t| t.role != Role::User)
        {
            history.turns.remove(0);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
