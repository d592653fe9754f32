//! TurnStore trait — durable, session-keyed conversation memory.
//!
//! A Turn is one (user message, assistant reply) pair. Turns are immutable
//! once written: the store appends, never edits, and `load_history` always
//! returns them in arrival order. Reads are windowed — the store keeps the
//! full log, but callers ask only for the most recent N turns so the LLM
//! context cost per request stays bounded.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::error::StoreError;
use crate::message::{Message, SessionKey};

/// One stored conversational turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Position within the session, strictly increasing from 0.
    pub seq: i64,

    /// What the user said.
    pub human_text: String,

    /// What the assistant replied.
    pub assistant_text: String,

    /// When the turn was persisted.
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Expand this turn into the (user, assistant) message pair the
    /// provider context is rebuilt from.
    pub fn to_messages(&self) -> [Message; 2] {
        [
            Message::user(&self.human_text),
            Message::assistant(&self.assistant_text),
        ]
    }
}

/// The core TurnStore trait.
///
/// Implementations: SQLite (embedded file), PostgreSQL (networked),
/// in-memory (for testing). The backend is selected by connection URL at
/// startup and is transparent to callers — ordering and atomicity
/// guarantees are identical across backends.
#[async_trait]
pub trait TurnStore: Send + Sync + std::fmt::Debug {
    /// The backend name (e.g., "sqlite", "postgres", "in_memory").
    fn name(&self) -> &str;

    /// Load the most recent `limit` turns for a session, oldest first.
    /// Returns an empty vec for an unknown session. A `limit` of 0 means
    /// no cap.
    async fn load_history(
        &self,
        session: &SessionKey,
        limit: usize,
    ) -> std::result::Result<Vec<Turn>, StoreError>;

    /// Atomically append a turn. The sequence number is assigned by the
    /// store; a partially written turn is never visible to a concurrent
    /// `load_history` on the same session.
    async fn append_turn(
        &self,
        session: &SessionKey,
        human_text: &str,
        assistant_text: &str,
    ) -> std::result::Result<Turn, StoreError>;

    /// Number of turns recorded for a session.
    async fn count(&self, session: &SessionKey) -> std::result::Result<usize, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_expands_to_message_pair() {
        let turn = Turn {
            seq: 0,
            human_text: "Schedule a meeting tomorrow".into(),
            assistant_text: "What time, and what should I call it?".into(),
            created_at: Utc::now(),
        };
        let [user, assistant] = turn.to_messages();
        assert_eq!(user.role, crate::message::Role::User);
        assert_eq!(user.content, "Schedule a meeting tomorrow");
        assert_eq!(assistant.role, crate::message::Role::Assistant);
    }

    #[test]
    fn turn_serialization_roundtrip() {
        let turn = Turn {
            seq: 3,
            human_text: "hi".into(),
            assistant_text: "hello".into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&turn).unwrap();
        let back: Turn = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seq, 3);
        assert_eq!(back.human_text, "hi");
    }
}
