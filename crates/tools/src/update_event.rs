//! Event update.
//!
//! Calendar-service updates can fail for reasons opaque to the agent
//! (stale ids, malformed recurrence). Failures come back as unsuccessful
//! results so the agent loop can fall back to its create-then-delete swap.

use async_trait::async_trait;
use daybook_calendar::{CalendarClient, EventPatch, EventTime};
use daybook_core::error::ToolError;
use daybook_core::tool::{Tool, ToolResult};
use std::sync::Arc;

use crate::create_event::parse_event_time;

pub struct UpdateEventTool {
    client: Arc<CalendarClient>,
}

impl UpdateEventTool {
    pub fn new(client: Arc<CalendarClient>) -> Self {
        Self { client }
    }
}

/// Build the patch payload from tool arguments.
fn patch_from_arguments(arguments: &serde_json::Value) -> Result<EventPatch, ToolError> {
    let mut patch = EventPatch::default();

    if let Some(title) = arguments["title"].as_str() {
        patch.summary = Some(title.to_string());
    }
    if let Some(start) = arguments["start_time"].as_str() {
        patch.start = Some(EventTime::timed(parse_event_time(start)?));
    }
    if let Some(end) = arguments["end_time"].as_str() {
        patch.end = Some(EventTime::timed(parse_event_time(end)?));
    }
    if let Some(description) = arguments["description"].as_str() {
        patch.description = Some(description.to_string());
    }
    if let Some(location) = arguments["location"].as_str() {
        patch.location = Some(location.to_string());
    }

    Ok(patch)
}

#[async_trait]
impl Tool for UpdateEventTool {
    fn name(&self) -> &str {
        "update_event"
    }

    fn description(&self) -> &str {
        "Update an existing calendar event. Requires the EVENT_ID obtained \
         from list_events or find_event in this conversation turn. \
         Pass the updated fields AND keep the unchanged fields from the lookup."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "event_id": {
                    "type": "string",
                    "description": "The EVENT_ID of the event to update"
                },
                "title": {
                    "type": "string",
                    "description": "New or retained event title"
                },
                "start_time": {
                    "type": "string",
                    "description": "New or retained start, RFC3339 with +07:00 offset"
                },
                "end_time": {
                    "type": "string",
                    "description": "New or retained end, RFC3339 with +07:00 offset"
                },
                "description": {
                    "type": "string",
                    "description": "New or retained description"
                },
                "location": {
                    "type": "string",
                    "description": "New or retained location"
                }
            },
            "required": ["event_id"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let event_id = arguments["event_id"]
            .as_str()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'event_id' argument".into()))?;

        let patch = patch_from_arguments(&arguments)?;
        if patch.is_empty() {
            return Err(ToolError::InvalidArguments(
                "Update contains no fields to change".into(),
            ));
        }

        match self.client.patch(event_id, &patch).await {
            Ok(updated) => Ok(ToolResult {
                call_id: String::new(),
                success: true,
                output: format!(
                    "Updated event '{}'. New schedule: {}",
                    updated.title(),
                    updated.schedule_line()
                ),
                data: Some(serde_json::json!({ "event_ids": [updated.id] })),
            }),
            Err(e) => Ok(ToolResult {
                call_id: String::new(),
                success: false,
                output: format!("Error updating event {event_id}: {e}"),
                data: None,
            }),
        }
    }
}
