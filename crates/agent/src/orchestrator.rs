//! The turn orchestrator — the per-message entry point.
//!
//! Sequence for every inbound message: identity gate → history load →
//! agent loop → best-effort turn persistence → reply. A denied sender gets
//! no conversational processing at all: the store and the tools are never
//! touched, and the only side effects are the intrusion alert and the
//! audit entry.

use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use daybook_core::error::{Error, ProviderError};
use daybook_core::event::{DomainEvent, EventBus};
use daybook_core::message::{Conversation, Message, SessionKey};
use daybook_core::store::TurnStore;
use daybook_security::{Access, AuditEvent, AuditLogger, AuditOutcome, IdentityGate};
use tokio::sync::Mutex;
use tracing::{error, warn};

use crate::loop_runner::AgentLoop;

/// One-way delivery of intrusion alerts to the owner's own channel.
///
/// This is not a reply to the offender — the transport decides separately
/// whether to show the offender a static block notice.
#[async_trait]
pub trait IntrusionNotifier: Send + Sync {
    async fn alert(&self, text: &str);
}

/// A notifier that only logs. Used when no channel is attached.
pub struct LogOnlyNotifier;

#[async_trait]
impl IntrusionNotifier for LogOnlyNotifier {
    async fn alert(&self, text: &str) {
        warn!(alert = %text, "Intrusion alert (no channel attached)");
    }
}

/// Sequences the identity gate, turn store, and agent loop per message.
pub struct Orchestrator {
    gate: IdentityGate,
    store: Arc<dyn TurnStore>,
    agent: AgentLoop,
    audit: Arc<AuditLogger>,
    notifier: Arc<dyn IntrusionNotifier>,
    event_bus: Arc<EventBus>,

    /// How many recent turns are replayed into the LLM context.
    history_turns: usize,

    /// Per-session locks. Messages for the same session are handled one at
    /// a time so turns persist in arrival order; distinct sessions proceed
    /// concurrently.
    session_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Orchestrator {
    pub fn new(
        gate: IdentityGate,
        store: Arc<dyn TurnStore>,
        agent: AgentLoop,
        audit: Arc<AuditLogger>,
        notifier: Arc<dyn IntrusionNotifier>,
        event_bus: Arc<EventBus>,
        history_turns: usize,
    ) -> Self {
        Self {
            gate,
            store,
            agent,
            audit,
            notifier,
            event_bus,
            history_turns,
            session_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Handle one inbound message.
    ///
    /// Returns `Ok(Some(reply))` for the authorized sender — always, even
    /// when the reply is an apology — and `Ok(None)` for a denied sender.
    pub async fn handle_message(
        &self,
        sender_id: &str,
        session_key: &SessionKey,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, Error> {
        self.event_bus.publish(DomainEvent::MessageReceived {
            sender_id: sender_id.into(),
            session_key: session_key.to_string(),
            timestamp: now,
        });

        if let Access::Denied { sender_id } = self.gate.check(sender_id) {
            self.report_intrusion(&sender_id, text, now).await;
            return Ok(None);
        }

        let lock = self.session_lock(session_key).await;
        let _guard = lock.lock().await;

        let history = match self.store.load_history(session_key, self.history_turns).await {
            Ok(history) => history,
            Err(e) => {
                // Conversational continuity degrades, the reply does not.
                warn!(session = %session_key, error = %e, "History load failed, continuing without context");
                Vec::new()
            }
        };

        let mut conversation = Conversation::new(session_key.clone());
        for turn in &history {
            let [user, assistant] = turn.to_messages();
            conversation.push(user);
            conversation.push(assistant);
        }
        conversation.push(Message::user(text));

        let reply = match self.agent.process(&mut conversation, now).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(session = %session_key, error = %e, "Agent run failed");
                self.event_bus.publish(DomainEvent::ErrorOccurred {
                    context: "agent_loop".into(),
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });
                apology_for(&e)
            }
        };

        self.persist_turn(session_key, text, &reply).await;

        Ok(Some(reply))
    }

    /// Alert the owner and record the audit entry for a denied sender.
    async fn report_intrusion(&self, sender_id: &str, text: &str, now: DateTime<Utc>) {
        warn!(
            severity = "intrusion",
            sender_id = %sender_id,
            "Unauthorized access blocked"
        );

        self.audit.log(
            AuditEvent::IntrusionAttempt,
            sender_id,
            AuditOutcome::Denied,
            Some(format!("they typed: {}", preview(text))),
        );

        self.event_bus.publish(DomainEvent::IntrusionDetected {
            sender_id: sender_id.into(),
            timestamp: now,
        });

        let alert = format!(
            "SECURITY ALERT\n\
             Someone tried to access your calendar assistant.\n\
             Sender ID: {sender_id}\n\
             Time: {}\n\
             They typed: {}",
            now.to_rfc3339(),
            preview(text),
        );
        self.notifier.alert(&alert).await;
    }

    /// Best-effort persistence: one retry, never blocks the reply.
    async fn persist_turn(&self, session_key: &SessionKey, human: &str, assistant: &str) {
        let mut attempt = self.store.append_turn(session_key, human, assistant).await;
        if attempt.is_err() {
            attempt = self.store.append_turn(session_key, human, assistant).await;
        }

        match attempt {
            Ok(turn) => {
                self.event_bus.publish(DomainEvent::TurnPersisted {
                    session_key: session_key.to_string(),
                    seq: turn.seq,
                    timestamp: Utc::now(),
                });
            }
            Err(e) => {
                // Distinct from conversational failures: the reply was fine,
                // the memory of it is what's lost.
                error!(session = %session_key, error = %e, "Turn persistence failed, session continues without this turn");
                self.audit.log(
                    AuditEvent::PersistenceFailure {
                        session_key: session_key.to_string(),
                    },
                    session_key.as_str(),
                    AuditOutcome::Failure,
                    Some(e.to_string()),
                );
            }
        }
    }

    async fn session_lock(&self, session_key: &SessionKey) -> Arc<Mutex<()>> {
        let mut locks = self.session_locks.lock().await;
        locks
            .entry(session_key.as_str().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Truncate a message for logs and alerts.
fn preview(text: &str) -> String {
    const MAX: usize = 200;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(MAX).collect();
        format!("{truncated}…")
    }
}

/// Map an agent failure to the user-facing apology. The user always gets a
/// final reply; these categorize the common failure modes.
fn apology_for(error: &Error) -> String {
    match error {
        Error::Provider(ProviderError::RateLimited { .. })
        | Error::Provider(ProviderError::ApiError { status_code: 429, .. }) => {
            "My AI engine is receiving too many requests right now or has \
             reached its daily capacity. Please try again later!"
                .into()
        }
        Error::Provider(ProviderError::AuthenticationFailed(_)) => {
            "My API key seems to be invalid or expired. Please check the \
             system configuration."
                .into()
        }
        Error::Calendar(_) => {
            "I'm having trouble accessing the calendar. The authorization \
             may have expired — please try again in a moment."
                .into()
        }
        _ => {
            "My AI engine is currently unreachable or ran into an unexpected \
             issue. Please try again in a moment!"
                .into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybook_core::provider::{Provider, ProviderRequest, ProviderResponse};
    use daybook_core::tool::ToolRegistry;
    use daybook_store::InMemoryStore;
    use std::sync::Mutex as StdMutex;

    struct FixedProvider {
        reply: String,
        fail: bool,
    }

    #[async_trait]
    impl Provider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            if self.fail {
                return Err(ProviderError::RateLimited { retry_after_secs: 5 });
            }
            Ok(ProviderResponse {
                message: Message::assistant(&self.reply),
                usage: None,
                model: "fixed".into(),
            })
        }
    }

    struct SpyNotifier {
        alerts: StdMutex<Vec<String>>,
    }

    impl SpyNotifier {
        fn new() -> Self {
            Self {
                alerts: StdMutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl IntrusionNotifier for SpyNotifier {
        async fn alert(&self, text: &str) {
            self.alerts.lock().unwrap().push(text.to_string());
        }
    }

    fn orchestrator_with(
        reply: &str,
        fail_provider: bool,
        store: Arc<InMemoryStore>,
        notifier: Arc<SpyNotifier>,
    ) -> Orchestrator {
        let event_bus = Arc::new(EventBus::default());
        let agent = AgentLoop::new(
            Arc::new(FixedProvider {
                reply: reply.into(),
                fail: fail_provider,
            }),
            "fixed",
            0.3,
            Arc::new(ToolRegistry::new()),
            event_bus.clone(),
        );

        Orchestrator::new(
            IdentityGate::new("owner_42"),
            store,
            agent,
            Arc::new(AuditLogger::new()),
            notifier,
            event_bus,
            5,
        )
    }

    #[tokio::test]
    async fn authorized_message_replies_and_persists() {
        let store = Arc::new(InMemoryStore::new());
        let notifier = Arc::new(SpyNotifier::new());
        let orch = orchestrator_with("Hello! How can I help?", false, store.clone(), notifier);

        let session = SessionKey::new("chat_1");
        let reply = orch
            .handle_message("owner_42", &session, "hi", Utc::now())
            .await
            .unwrap();

        assert_eq!(reply.as_deref(), Some("Hello! How can I help?"));
        assert_eq!(store.count(&session).await.unwrap(), 1);

        let history = store.load_history(&session, 0).await.unwrap();
        assert_eq!(history[0].human_text, "hi");
        assert_eq!(history[0].assistant_text, "Hello! How can I help?");
    }

    #[tokio::test]
    async fn denied_sender_gets_no_reply_and_one_alert() {
        let store = Arc::new(InMemoryStore::new());
        let notifier = Arc::new(SpyNotifier::new());
        let orch = orchestrator_with("should never be seen", false, store.clone(), notifier.clone());

        let session = SessionKey::new("chat_intruder");
        let reply = orch
            .handle_message("stranger_7", &session, "show my schedule", Utc::now())
            .await
            .unwrap();

        assert_eq!(reply, None);

        // The store was never touched for the denied sender.
        assert_eq!(store.count(&session).await.unwrap(), 0);

        // Exactly one alert, carrying the offender's id and message.
        let alerts = notifier.alerts.lock().unwrap();
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].contains("stranger_7"));
        assert!(alerts[0].contains("show my schedule"));
    }

    #[tokio::test]
    async fn provider_failure_still_yields_a_reply() {
        let store = Arc::new(InMemoryStore::new());
        let notifier = Arc::new(SpyNotifier::new());
        let orch = orchestrator_with("unused", true, store.clone(), notifier);

        let session = SessionKey::new("chat_1");
        let reply = orch
            .handle_message("owner_42", &session, "hi", Utc::now())
            .await
            .unwrap()
            .expect("authorized users always get a reply");

        assert!(reply.contains("too many requests"));
    }

    #[tokio::test]
    async fn persistence_failure_does_not_block_reply() {
        let store = Arc::new(InMemoryStore::new());
        let notifier = Arc::new(SpyNotifier::new());
        let orch = orchestrator_with("Noted!", false, store.clone(), notifier);

        store.fail_appends(true);

        let session = SessionKey::new("chat_1");
        let reply = orch
            .handle_message("owner_42", &session, "remember this", Utc::now())
            .await
            .unwrap();

        assert_eq!(reply.as_deref(), Some("Noted!"));
        assert_eq!(store.count(&session).await.unwrap(), 0, "turn was not recorded");
    }

    #[tokio::test]
    async fn turns_persist_in_arrival_order() {
        let store = Arc::new(InMemoryStore::new());
        let notifier = Arc::new(SpyNotifier::new());
        let orch = Arc::new(orchestrator_with("ok", false, store.clone(), notifier));

        let session = SessionKey::new("chat_1");
        for i in 0..4 {
            orch.handle_message("owner_42", &session, &format!("message {i}"), Utc::now())
                .await
                .unwrap();
        }

        let history = store.load_history(&session, 0).await.unwrap();
        assert_eq!(history.len(), 4);
        for (i, turn) in history.iter().enumerate() {
            assert_eq!(turn.seq, i as i64);
            assert_eq!(turn.human_text, format!("message {i}"));
        }
    }

    #[tokio::test]
    async fn history_window_bounds_context() {
        let store = Arc::new(InMemoryStore::new());
        for i in 0..20 {
            store
                .append_turn(&SessionKey::new("chat_1"), &format!("q{i}"), &format!("a{i}"))
                .await
                .unwrap();
        }

        let notifier = Arc::new(SpyNotifier::new());
        let orch = orchestrator_with("ok", false, store.clone(), notifier);

        // history_turns = 5, so the conversation the agent sees is
        // 5 pairs + new user message (+ system prompt).
        let session = SessionKey::new("chat_1");
        orch.handle_message("owner_42", &session, "latest", Utc::now())
            .await
            .unwrap();

        // All 21 turns are still in storage; the window only bounds context.
        assert_eq!(store.count(&session).await.unwrap(), 21);
    }

    #[test]
    fn apologies_are_categorized() {
        let quota = apology_for(&Error::Provider(ProviderError::RateLimited {
            retry_after_secs: 5,
        }));
        assert!(quota.contains("too many requests"));

        let auth = apology_for(&Error::Provider(ProviderError::AuthenticationFailed(
            "bad key".into(),
        )));
        assert!(auth.contains("API key"));

        let calendar = apology_for(&Error::Calendar(
            daybook_core::error::CalendarError::Timeout(30),
        ));
        assert!(calendar.contains("calendar"));

        let generic = apology_for(&Error::Internal("boom".into()));
        assert!(generic.contains("unexpected"));
    }

    #[test]
    fn preview_truncates_long_text() {
        let long = "x".repeat(500);
        let p = preview(&long);
        assert!(p.chars().count() <= 201);
        assert!(p.ends_with('…'));
        assert_eq!(preview("short"), "short");
    }
}
