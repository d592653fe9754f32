//! Event creation.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use daybook_calendar::{local_offset, CalendarClient, EventDraft, EventTime};
use daybook_core::error::ToolError;
use daybook_core::tool::{Tool, ToolResult};
use std::sync::Arc;

pub struct CreateEventTool {
    client: Arc<CalendarClient>,
}

impl CreateEventTool {
    pub fn new(client: Arc<CalendarClient>) -> Self {
        Self { client }
    }
}

/// Parse an event boundary. Accepts full RFC3339; a bare
/// `YYYY-MM-DDTHH:MM:SS` is interpreted at the fixed local offset.
pub(crate) fn parse_event_time(s: &str) -> Result<DateTime<FixedOffset>, ToolError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s.trim()) {
        return Ok(dt);
    }
    NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%dT%H:%M:%S")
        .ok()
        .and_then(|naive| naive.and_local_timezone(local_offset()).single())
        .ok_or_else(|| {
            ToolError::InvalidArguments(format!(
                "Invalid timestamp '{s}': expected RFC3339 or YYYY-MM-DDTHH:MM:SS"
            ))
        })
}

#[async_trait]
impl Tool for CreateEventTool {
    fn name(&self) -> &str {
        "create_event"
    }

    fn description(&self) -> &str {
        "Create a new calendar event. Requires a title plus start and end \
         timestamps (RFC3339, e.g. 2025-03-14T14:00:00+07:00). \
         Description and location are optional."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "The event title"
                },
                "start_time": {
                    "type": "string",
                    "description": "Event start, RFC3339 with +07:00 offset"
                },
                "end_time": {
                    "type": "string",
                    "description": "Event end, RFC3339 with +07:00 offset"
                },
                "description": {
                    "type": "string",
                    "description": "Optional longer description"
                },
                "location": {
                    "type": "string",
                    "description": "Optional location"
                }
            },
            "required": ["title", "start_time", "end_time"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let title = arguments["title"]
            .as_str()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'title' argument".into()))?;
        let start_raw = arguments["start_time"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'start_time' argument".into()))?;
        let end_raw = arguments["end_time"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'end_time' argument".into()))?;

        let start = parse_event_time(start_raw)?;
        let end = parse_event_time(end_raw)?;
        if end <= start {
            return Err(ToolError::InvalidArguments(format!(
                "end_time {end_raw} is not after start_time {start_raw}"
            )));
        }

        let draft = EventDraft {
            summary: title.into(),
            start: EventTime::timed(start),
            end: EventTime::timed(end),
            description: arguments["description"].as_str().map(String::from),
            location: arguments["location"].as_str().map(String::from),
        };

        match self.client.insert(&draft).await {
            Ok(created) => Ok(ToolResult {
                call_id: String::new(),
                success: true,
                output: format!(
                    "Created event '{}' from {} to {}. EVENT_ID: {}",
                    title,
                    start.to_rfc3339(),
                    end.to_rfc3339(),
                    created.id
                ),
                data: Some(serde_json::json!({ "event_ids": [created.id] })),
            }),
            Err(e) => Ok(ToolResult {
                call_id: String::new(),
                success: false,
                output: format!("Error creating event: {e}"),
                data: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> CreateEventTool {
        CreateEventTool::new(Arc::new(CalendarClient::new("primary", "tok", 30)))
    }

    #[test]
    fn parse_rfc3339_boundary() {
        let dt = parse_event_time("2025-03-14T14:00:00+07:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-03-14T14:00:00+07:00");
    }

    #[test]
    fn parse_bare_timestamp_uses_local_offset() {
        let dt = parse_event_time("2025-03-14T14:00:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 7 * 3600);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_event_time("2 PM tomorrow").is_err());
    }

    #[tokio::test]
    async fn missing_title_rejected() {
        let result = tool()
            .execute(serde_json::json!({
                "start_time": "2025-03-14T14:00:00+07:00",
                "end_time": "2025-03-14T15:00:00+07:00"
            }))
            .await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[tokio::test]
    async fn end_before_start_rejected() {
        let result = tool()
            .execute(serde_json::json!({
                "title": "Team Sync",
                "start_time": "2025-03-14T15:00:00+07:00",
                "end_time": "2025-03-14T14:00:00+07:00"
            }))
            .await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[test]
    fn tool_definition() {
        let def = tool().to_definition();
        assert_eq!(def.name, "create_event");
        let required = def.parameters["required"].as_array().unwrap();
        assert_eq!(required.len(), 3);
    }
}
