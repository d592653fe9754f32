//! The agent reasoning loop implementation.
//!
//! Each message runs through a bounded Reasoning → ToolDispatch cycle: the
//! LLM either requests exactly the tool calls it needs next or finalizes
//! with reply text. Two policies are enforced deterministically by the loop
//! itself, independent of what the model decides:
//!
//! - **Id discipline** — `update_event`/`delete_event` calls whose id was
//!   not produced by a same-turn lookup are rejected locally and never reach
//!   the calendar service.
//! - **The swap fallback** — when an update fails at the service, the loop
//!   creates a replacement event with the intended values and deletes the
//!   original, then reports the consolidated outcome. Reads are retried
//!   once; mutations never are, beyond this swap.

use std::collections::HashSet;
use std::sync::Arc;
use chrono::{DateTime, Utc};
use daybook_core::event::{DomainEvent, EventBus};
use daybook_core::message::{Conversation, Message, Role};
use daybook_core::provider::{Provider, ProviderRequest};
use daybook_core::tool::{ToolCall, ToolRegistry, ToolResult};
use daybook_core::error::ToolError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::sop;

/// Tools whose results may be retried (idempotent reads).
const READ_TOOLS: [&str; 2] = ["list_events", "find_event"];

/// Tools that must reference an id resolved earlier in the same turn.
const MUTATION_TOOLS: [&str; 2] = ["update_event", "delete_event"];

/// Reply used when the iteration guard trips.
const BUDGET_EXCEEDED_REPLY: &str =
    "I'm sorry — I couldn't finish working on that request. Please try again \
     with the full details in one message.";

/// The core agent loop that orchestrates LLM calls and tool execution.
pub struct AgentLoop {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Default max tokens per response
    max_tokens: Option<u32>,

    /// Tool registry
    tools: Arc<ToolRegistry>,

    /// Maximum tool call iterations per message
    max_iterations: u32,

    /// Event bus for domain events
    event_bus: Arc<EventBus>,
}

impl AgentLoop {
    /// Create a new agent loop.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
            max_iterations: 8,
            event_bus,
        }
    }

    /// Set the maximum number of tool call iterations.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Set the default max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Process a user message and generate a response.
    ///
    /// The conversation must already contain the loaded history plus the
    /// new user message; `now` anchors all relative-date reasoning.
    pub async fn process(
        &self,
        conversation: &mut Conversation,
        now: DateTime<Utc>,
    ) -> Result<String, daybook_core::Error> {
        info!(
            session = %conversation.session,
            messages = conversation.messages.len(),
            "Processing message"
        );

        // The SOP prompt is rebuilt each message so the wall clock is fresh.
        let system_prompt = sop::build_system_prompt(now);
        if conversation.messages.is_empty() || conversation.messages[0].role != Role::System {
            conversation.messages.insert(0, Message::system(&system_prompt));
        } else {
            conversation.messages[0] = Message::system(&system_prompt);
        }

        let tool_definitions = self.tools.definitions();

        // Ids observed from the calendar service during this message's
        // cycle. Mutations may only target these.
        let mut resolved_ids: HashSet<String> = HashSet::new();

        let mut iteration = 0;

        loop {
            iteration += 1;

            if iteration > self.max_iterations {
                warn!(
                    session = %conversation.session,
                    iterations = iteration,
                    "Max tool iterations reached, forcing final reply"
                );
                break;
            }

            debug!(
                session = %conversation.session,
                iteration = iteration,
                "Agent loop iteration"
            );

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: conversation.messages.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tool_definitions.clone(),
            };

            let response = self.provider.complete(request).await?;

            if let Some(usage) = &response.usage {
                self.event_bus.publish(DomainEvent::ResponseGenerated {
                    session_key: conversation.session.to_string(),
                    model: response.model.clone(),
                    tokens_used: usage.total_tokens,
                    timestamp: Utc::now(),
                });
            }

            if response.message.tool_calls.is_empty() {
                // No tool calls — this is the final text response
                let response_text = response.message.content.clone();
                conversation.push(response.message);
                return Ok(response_text);
            }

            let tool_calls = response.message.tool_calls.clone();
            conversation.push(response.message);

            for tc in &tool_calls {
                let call = ToolCall {
                    id: tc.id.clone(),
                    name: tc.name.clone(),
                    arguments: serde_json::from_str(&tc.arguments).unwrap_or_default(),
                };

                // Id discipline: a mutation referencing an id the service
                // never produced this turn is rejected before dispatch.
                if MUTATION_TOOLS.contains(&call.name.as_str()) {
                    let target = call.arguments["event_id"].as_str().unwrap_or_default();
                    if !resolved_ids.contains(target) {
                        warn!(
                            tool = %call.name,
                            event_id = %target,
                            "Rejecting mutation with unresolved event id"
                        );
                        let err = ToolError::UnresolvedEventId {
                            event_id: target.into(),
                        };
                        conversation.push(Message::tool_result(
                            &tc.id,
                            format!(
                                "Error: {err}. Call 'list_events' or 'find_event' first \
                                 and use an EVENT_ID from its response; never guess ids."
                            ),
                        ));
                        continue;
                    }
                }

                match self.dispatch(&call).await {
                    Ok(result) => {
                        for id in result.event_ids() {
                            resolved_ids.insert(id);
                        }

                        if call.name == "update_event" && !result.success {
                            // Deterministic fallback: replace the event
                            // instead of surfacing the raw failure.
                            let original_id = call.arguments["event_id"]
                                .as_str()
                                .unwrap_or_default()
                                .to_string();
                            let swap_note = self
                                .swap_fallback(&call.arguments, &original_id, &mut resolved_ids)
                                .await;
                            conversation.push(Message::tool_result(
                                &tc.id,
                                format!("{}\n{}", result.output, swap_note),
                            ));
                        } else {
                            conversation.push(Message::tool_result(&tc.id, &result.output));
                        }
                    }
                    Err(e) => {
                        warn!(tool = %tc.name, error = %e, "Tool execution failed");
                        // Report error to the LLM so it can recover
                        conversation.push(Message::tool_result(&tc.id, format!("Error: {e}")));
                    }
                }
            }

            // Loop back — the LLM sees the tool results and decides what to do next
        }

        Ok(BUDGET_EXCEEDED_REPLY.into())
    }

    /// Execute one tool call, retrying idempotent reads a single time.
    async fn dispatch(&self, call: &ToolCall) -> Result<ToolResult, ToolError> {
        let start = std::time::Instant::now();
        let mut result = self.tools.execute(call).await;

        if READ_TOOLS.contains(&call.name.as_str()) && Self::is_service_failure(&result) {
            debug!(tool = %call.name, "Read failed, retrying once");
            result = self.tools.execute(call).await;
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let success = matches!(&result, Ok(r) if r.success);
        self.event_bus.publish(DomainEvent::ToolExecuted {
            tool_name: call.name.clone(),
            success,
            duration_ms,
            timestamp: Utc::now(),
        });

        result
    }

    /// Whether a dispatch outcome is a service-level failure (as opposed to
    /// a locally rejected call, which is deterministic and not retried).
    fn is_service_failure(result: &Result<ToolResult, ToolError>) -> bool {
        match result {
            Ok(r) => !r.success,
            Err(ToolError::ExecutionFailed { .. }) | Err(ToolError::Timeout { .. }) => true,
            Err(_) => false,
        }
    }

    /// The swap fallback for a failed update: create a replacement event
    /// carrying the intended field values, then delete the original.
    ///
    /// Returns a consolidated note appended to the update's tool result.
    /// The underlying service has no cross-call transaction, so a failed
    /// delete after a successful create leaves a duplicate; that outcome is
    /// reported, never hidden.
    async fn swap_fallback(
        &self,
        update_args: &serde_json::Value,
        original_id: &str,
        resolved_ids: &mut HashSet<String>,
    ) -> String {
        info!(event_id = %original_id, "Update failed, attempting create-then-delete swap");

        let mut create_args = update_args.clone();
        if let Some(obj) = create_args.as_object_mut() {
            obj.remove("event_id");
        }

        let has_full_fields = ["title", "start_time", "end_time"]
            .iter()
            .all(|k| create_args.get(*k).and_then(|v| v.as_str()).is_some());
        if !has_full_fields {
            return "Automatic fallback was not possible: the update call did not \
                    carry the event's full field set (title, start_time, end_time). \
                    The update did NOT complete and the calendar was not changed. \
                    Tell the user explicitly that the update could not be completed."
                .into();
        }

        let create_call = ToolCall {
            id: format!("swap_create_{}", Uuid::new_v4()),
            name: "create_event".into(),
            arguments: create_args,
        };

        let create_result = match self.dispatch(&create_call).await {
            Ok(r) if r.success => r,
            Ok(r) => {
                return format!(
                    "Automatic fallback failed: a replacement event could not be \
                     created ({}). The update did NOT complete and the calendar was \
                     not changed. Tell the user explicitly that the update could not \
                     be completed.",
                    r.output
                );
            }
            Err(e) => {
                return format!(
                    "Automatic fallback failed: a replacement event could not be \
                     created (Error: {e}). The update did NOT complete and the \
                     calendar was not changed. Tell the user explicitly that the \
                     update could not be completed."
                );
            }
        };

        for id in create_result.event_ids() {
            resolved_ids.insert(id);
        }

        let delete_call = ToolCall {
            id: format!("swap_delete_{}", Uuid::new_v4()),
            name: "delete_event".into(),
            arguments: serde_json::json!({ "event_id": original_id }),
        };

        let delete_failed = match self.dispatch(&delete_call).await {
            Ok(r) => !r.success,
            Err(_) => true,
        };

        if delete_failed {
            warn!(event_id = %original_id, "Swap delete failed, duplicate event may remain");
            format!(
                "Automatic fallback partially succeeded: {} However, the original \
                 event ({original_id}) could NOT be deleted, so the update could NOT \
                 be completed cleanly and a duplicate may remain on the calendar. \
                 Tell the user explicitly.",
                create_result.output
            )
        } else {
            format!(
                "The event was updated via replacement: {} The original event \
                 ({original_id}) was deleted. Confirm the change to the user.",
                create_result.output
            )
        }
    }
}
