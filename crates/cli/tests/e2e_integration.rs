//! End-to-end tests over the assembled stack: orchestrator + agent loop +
//! in-memory store + stub channel, with a scripted provider standing in
//! for the LLM and scripted tools standing in for the calendar service.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use daybook_agent::{AgentLoop, IntrusionNotifier, Orchestrator};
use daybook_channels::{TelegramChannel, TelegramConfig};
use daybook_core::Channel;
use daybook_core::error::{ProviderError, ToolError};
use daybook_core::event::EventBus;
use daybook_core::message::{Message, MessageToolCall, SessionKey};
use daybook_core::provider::{Provider, ProviderRequest, ProviderResponse};
use daybook_core::store::TurnStore;
use daybook_core::tool::{Tool, ToolRegistry, ToolResult};
use daybook_security::{AuditLogger, AuditOutcome, IdentityGate};
use daybook_store::InMemoryStore;

// --- scripted doubles ---

struct ScriptedProvider {
    responses: Mutex<VecDeque<ProviderResponse>>,
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        _request: ProviderRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| text_response("done")))
    }
}

fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: None,
        model: "scripted".into(),
    }
}

fn tool_call_response(name: &str, args: serde_json::Value) -> ProviderResponse {
    let mut message = Message::assistant("");
    message.tool_calls = vec![MessageToolCall {
        id: format!("call_{name}"),
        name: name.into(),
        arguments: args.to_string(),
    }];
    ProviderResponse {
        message,
        usage: None,
        model: "scripted".into(),
    }
}

type DispatchLog = Arc<Mutex<Vec<(String, serde_json::Value)>>>;

struct RecordingTool {
    name: &'static str,
    result: ToolResult,
    log: DispatchLog,
}

#[async_trait]
impl Tool for RecordingTool {
    fn name(&self) -> &str {
        self.name
    }
    fn description(&self) -> &str {
        "test double"
    }
    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }
    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        self.log
            .lock()
            .unwrap()
            .push((self.name.to_string(), arguments));
        Ok(self.result.clone())
    }
}

struct ChannelNotifier {
    channel: Arc<TelegramChannel>,
}

#[async_trait]
impl IntrusionNotifier for ChannelNotifier {
    async fn alert(&self, text: &str) {
        let chat = self.channel.alert_chat_id().to_string();
        let _ = self.channel.send(&chat, text).await;
    }
}

struct NoopNotifier;

#[async_trait]
impl IntrusionNotifier for NoopNotifier {
    async fn alert(&self, _text: &str) {}
}

fn orchestrator(
    responses: Vec<ProviderResponse>,
    registry: ToolRegistry,
    store: Arc<InMemoryStore>,
    audit: Arc<AuditLogger>,
    notifier: Arc<dyn IntrusionNotifier>,
) -> Orchestrator {
    let event_bus = Arc::new(EventBus::default());
    let agent = AgentLoop::new(
        Arc::new(ScriptedProvider {
            responses: Mutex::new(responses.into()),
        }),
        "scripted",
        0.3,
        Arc::new(registry),
        event_bus.clone(),
    );
    Orchestrator::new(
        IdentityGate::new("owner_42"),
        store,
        agent,
        audit,
        notifier,
        event_bus,
        5,
    )
}

// --- the scenarios ---

/// "Schedule a meeting tomorrow" with no details yields a clarifying
/// question and no tool dispatch; the follow-up in the same session
/// completes the create and the store holds both turns.
#[tokio::test]
async fn multi_turn_create_completes_with_context() {
    let log: DispatchLog = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(RecordingTool {
        name: "create_event",
        result: ToolResult {
            call_id: String::new(),
            success: true,
            output: "Created event 'Team Sync'. EVENT_ID: evt_new".into(),
            data: Some(serde_json::json!({ "event_ids": ["evt_new"] })),
        },
        log: log.clone(),
    }));

    // Message time: 2025-03-14 10:00 at +07:00 — "tomorrow" is the 15th.
    let now = Utc.with_ymd_and_hms(2025, 3, 14, 3, 0, 0).unwrap();

    let responses = vec![
        // Turn 1: ask for the missing details, no tool call.
        text_response("Sure — what time should it run, and what should I call it?"),
        // Turn 2: create with the merged details, then confirm.
        tool_call_response(
            "create_event",
            serde_json::json!({
                "title": "Team Sync",
                "start_time": "2025-03-15T14:00:00+07:00",
                "end_time": "2025-03-15T15:00:00+07:00"
            }),
        ),
        text_response("Booked: Team Sync tomorrow from 2 PM to 3 PM."),
    ];

    let store = Arc::new(InMemoryStore::new());
    let orch = orchestrator(
        responses,
        registry,
        store.clone(),
        Arc::new(AuditLogger::new()),
        Arc::new(NoopNotifier),
    );

    let session = SessionKey::new("chat_owner");

    let first = orch
        .handle_message("owner_42", &session, "Schedule a meeting tomorrow", now)
        .await
        .unwrap()
        .unwrap();
    assert!(first.contains("what time"));
    assert!(log.lock().unwrap().is_empty(), "no tool on the first turn");

    let second = orch
        .handle_message(
            "owner_42",
            &session,
            "Call it Team Sync, from 2 PM to 3 PM",
            now,
        )
        .await
        .unwrap()
        .unwrap();
    assert!(second.contains("Team Sync"));

    // The create carried the merged details at the fixed +07:00 offset.
    let log = log.lock().unwrap();
    assert_eq!(log.len(), 1);
    let (name, args) = &log[0];
    assert_eq!(name, "create_event");
    assert_eq!(args["title"], "Team Sync");
    assert_eq!(args["start_time"], "2025-03-15T14:00:00+07:00");
    assert_eq!(args["end_time"], "2025-03-15T15:00:00+07:00");

    // Both turns persisted, in order.
    let history = store.load_history(&session, 0).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].human_text, "Schedule a meeting tomorrow");
    assert_eq!(history[1].human_text, "Call it Team Sync, from 2 PM to 3 PM");
}

/// An unauthorized sender gets no conversational processing: nothing is
/// stored, no tool runs, and exactly one alert lands in the owner's chat.
#[tokio::test]
async fn unauthorized_sender_triggers_one_alert_and_nothing_else() {
    let log: DispatchLog = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(RecordingTool {
        name: "list_events",
        result: ToolResult {
            call_id: String::new(),
            success: true,
            output: "should never run".into(),
            data: None,
        },
        log: log.clone(),
    }));

    let channel = Arc::new(TelegramChannel::new(TelegramConfig {
        bot_token: "tok".into(),
        alert_chat_id: "owner_chat".into(),
    }));

    let store = Arc::new(InMemoryStore::new());
    let audit = Arc::new(AuditLogger::new());
    let orch = orchestrator(
        vec![text_response("never sent")],
        registry,
        store.clone(),
        audit.clone(),
        Arc::new(ChannelNotifier {
            channel: channel.clone(),
        }),
    );

    let session = SessionKey::new("chat_intruder");
    let reply = orch
        .handle_message("stranger_9", &session, "what's on my calendar?", Utc::now())
        .await
        .unwrap();

    assert_eq!(reply, None, "denied senders get no conversational reply");
    assert_eq!(store.count(&session).await.unwrap(), 0);
    assert!(log.lock().unwrap().is_empty(), "no tool ran");

    // Exactly one alert, delivered to the owner's chat only.
    let sent = channel.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "owner_chat");
    assert!(sent[0].1.contains("stranger_9"));

    // And exactly one denied audit entry.
    assert_eq!(audit.entries_by_outcome(&AuditOutcome::Denied).len(), 1);
}

/// A second message for the same session waits for the first: turns land
/// in arrival order even when the calls race.
#[tokio::test]
async fn same_session_messages_are_serialized() {
    let responses: Vec<ProviderResponse> =
        (0..6).map(|i| text_response(&format!("reply {i}"))).collect();

    let store = Arc::new(InMemoryStore::new());
    let orch = Arc::new(orchestrator(
        responses,
        ToolRegistry::new(),
        store.clone(),
        Arc::new(AuditLogger::new()),
        Arc::new(NoopNotifier),
    ));

    let session = SessionKey::new("chat_owner");
    let mut handles = Vec::new();
    for i in 0..6 {
        let orch = orch.clone();
        let session = session.clone();
        handles.push(tokio::spawn(async move {
            orch.handle_message("owner_42", &session, &format!("message {i}"), Utc::now())
                .await
                .unwrap()
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    let history = store.load_history(&session, 0).await.unwrap();
    assert_eq!(history.len(), 6);
    let seqs: Vec<i64> = history.iter().map(|t| t.seq).collect();
    assert_eq!(seqs, (0..6).collect::<Vec<i64>>());
}
