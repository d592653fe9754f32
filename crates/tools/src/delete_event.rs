//! Event deletion.

use async_trait::async_trait;
use daybook_calendar::CalendarClient;
use daybook_core::error::ToolError;
use daybook_core::tool::{Tool, ToolResult};
use std::sync::Arc;

pub struct DeleteEventTool {
    client: Arc<CalendarClient>,
}

impl DeleteEventTool {
    pub fn new(client: Arc<CalendarClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for DeleteEventTool {
    fn name(&self) -> &str {
        "delete_event"
    }

    fn description(&self) -> &str {
        "Delete a calendar event. Requires the EVENT_ID obtained from \
         list_events or find_event in this conversation turn."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "event_id": {
                    "type": "string",
                    "description": "The EVENT_ID of the event to delete"
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

        match self.client.delete(event_id).await {
            Ok(()) => Ok(ToolResult {
                call_id: String::new(),
                success: true,
                output: format!("Deleted event {event_id}."),
                data: None,
            }),
            Err(e) => Ok(ToolResult {
                call_id: String::new(),
                success: false,
                output: format!("Error deleting event {event_id}: {e}"),
                data: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> DeleteEventTool {
        DeleteEventTool::new(Arc::new(CalendarClient::new("primary", "tok", 30)))
    }

    #[tokio::test]
    async fn missing_event_id_rejected() {
        let result = tool().execute(serde_json::json!({})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[tokio::test]
    async fn blank_event_id_rejected() {
        let result = tool().execute(serde_json::json!({"event_id": ""})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[test]
    fn tool_definition() {
        let def = tool().to_definition();
        assert_eq!(def.name, "delete_event");
    }
}
