//! In-memory store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chrono::Utc;
use daybook_core::error::StoreError;
use daybook_core::message::SessionKey;
use daybook_core::store::{Turn, TurnStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// An in-memory store keeping each session's turns in a Vec.
/// Useful for testing and sessions where persistence isn't needed.
#[derive(Debug)]
pub struct InMemoryStore {
    sessions: Arc<RwLock<HashMap<String, Vec<Turn>>>>,
    /// When set, every append fails — for exercising persistence-failure paths.
    fail_appends: std::sync::atomic::AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            fail_appends: std::sync::atomic::AtomicBool::new(false),
        }
    }

    /// Make every subsequent append fail (test hook).
    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TurnStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn load_history(
        &self,
        session: &SessionKey,
        limit: usize,
    ) -> Result<Vec<Turn>, StoreError> {
        let sessions = self.sessions.read().await;
        let turns = sessions.get(session.as_str()).cloned().unwrap_or_default();
        if limit == 0 || turns.len() <= limit {
            return Ok(turns);
        }
        Ok(turns[turns.len() - limit..].to_vec())
    }

    async fn append_turn(
        &self,
        session: &SessionKey,
        human_text: &str,
        assistant_text: &str,
    ) -> Result<Turn, StoreError> {
        if self.fail_appends.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(StoreError::Storage("append disabled by test hook".into()));
        }

        let mut sessions = self.sessions.write().await;
        let turns = sessions.entry(session.as_str().to_string()).or_default();
        let turn = Turn {
            seq: turns.len() as i64,
            human_text: human_text.into(),
            assistant_text: assistant_text.into(),
            created_at: Utc::now(),
        };
        turns.push(turn.clone());
        Ok(turn)
    }

    async fn count(&self, session: &SessionKey) -> Result<usize, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session.as_str()).map(|t| t.len()).unwrap_or(0))
    }
}
