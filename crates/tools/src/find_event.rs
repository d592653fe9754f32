//! Keyword search — the id resolver.
//!
//! Mutations need a concrete event id, and ids only come from the service.
//! This tool turns a natural-language reference ("the dentist appointment")
//! into candidate events with their ids, so an update or delete can target
//! the right one.

use async_trait::async_trait;
use daybook_calendar::CalendarClient;
use daybook_core::error::ToolError;
use daybook_core::tool::{Tool, ToolResult};
use std::sync::Arc;

pub struct FindEventTool {
    client: Arc<CalendarClient>,
}

impl FindEventTool {
    pub fn new(client: Arc<CalendarClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for FindEventTool {
    fn name(&self) -> &str {
        "find_event"
    }

    fn description(&self) -> &str {
        "Find the EVENT_ID of an event before updating or deleting it. \
         Provide a keyword or the event's name (e.g. 'Meeting' or 'Dentist'). \
         Returns matching events with their dates, times, and unique EVENT_IDs."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "keyword": {
                    "type": "string",
                    "description": "Search keyword, usually the event title or part of it"
                }
            },
            "required": ["keyword"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let keyword = arguments["keyword"]
            .as_str()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'keyword' argument".into()))?;

        let events = match self.client.search(keyword).await {
            Ok(events) => events,
            Err(e) => {
                return Ok(ToolResult {
                    call_id: String::new(),
                    success: false,
                    output: format!("Error searching events: {e}"),
                    data: None,
                });
            }
        };

        if events.is_empty() {
            return Ok(ToolResult {
                call_id: String::new(),
                success: true,
                output: format!("No events found matching the keyword: '{keyword}'."),
                data: Some(serde_json::json!({ "event_ids": [] })),
            });
        }

        let event_ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        let mut output = format!("Matching events found for '{keyword}':\n");
        for event in &events {
            output.push_str(&format!(
                "- {} | EVENT_ID: {}\n",
                event.schedule_line(),
                event.id
            ));
        }

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output,
            data: Some(serde_json::json!({ "event_ids": event_ids })),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> FindEventTool {
        FindEventTool::new(Arc::new(CalendarClient::new("primary", "tok", 30)))
    }

    #[tokio::test]
    async fn missing_keyword_rejected() {
        let result = tool().execute(serde_json::json!({})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[tokio::test]
    async fn blank_keyword_rejected() {
        let result = tool().execute(serde_json::json!({"keyword": "   "})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[test]
    fn tool_definition() {
        let def = tool().to_definition();
        assert_eq!(def.name, "find_event");
        assert!(def.description.contains("EVENT_ID"));
    }
}
