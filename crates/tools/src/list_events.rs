//! Date-range schedule listing.
//!
//! Fetches every event between two local dates, merging the primary
//! calendar with any configured read-only extras (holiday calendars).
//! An extra calendar that fails to answer is skipped rather than failing
//! the whole listing.

use async_trait::async_trait;
use daybook_calendar::{day_bounds, parse_date, CalendarClient, CalendarEvent};
use daybook_core::error::ToolError;
use daybook_core::tool::{Tool, ToolResult};
use std::sync::Arc;
use tracing::warn;

pub struct ListEventsTool {
    client: Arc<CalendarClient>,
    extra_calendars: Vec<String>,
}

impl ListEventsTool {
    pub fn new(client: Arc<CalendarClient>, extra_calendars: Vec<String>) -> Self {
        Self {
            client,
            extra_calendars,
        }
    }
}

#[async_trait]
impl Tool for ListEventsTool {
    fn name(&self) -> &str {
        "list_events"
    }

    fn description(&self) -> &str {
        "Retrieve all scheduled events and holidays within a date range. \
         Both start_date and end_date are required, strictly in YYYY-MM-DD format. \
         For a single day, pass the same date for both. \
         Each returned line carries the event's EVENT_ID."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "start_date": {
                    "type": "string",
                    "description": "First day of the range, YYYY-MM-DD"
                },
                "end_date": {
                    "type": "string",
                    "description": "Last day of the range, YYYY-MM-DD"
                }
            },
            "required": ["start_date", "end_date"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let start_date = arguments["start_date"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'start_date' argument".into()))?;
        let end_date = arguments["end_date"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'end_date' argument".into()))?;

        let start = parse_date(start_date)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        let end = parse_date(end_date).map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        if end < start {
            return Err(ToolError::InvalidArguments(format!(
                "end_date {end_date} is before start_date {start_date}"
            )));
        }

        let (time_min, _) = day_bounds(start);
        let (_, time_max) = day_bounds(end);

        let mut events: Vec<CalendarEvent> = match self.client.list_range(time_min, time_max).await
        {
            Ok(events) => events,
            Err(e) => {
                return Ok(ToolResult {
                    call_id: String::new(),
                    success: false,
                    output: format!("Error listing schedule: {e}"),
                    data: None,
                });
            }
        };

        // Secondary calendars are best-effort.
        for calendar_id in &self.extra_calendars {
            match self
                .client
                .list_range_in(calendar_id, time_min, time_max)
                .await
            {
                Ok(extra) => events.extend(extra),
                Err(e) => warn!(calendar = %calendar_id, error = %e, "Skipping extra calendar"),
            }
        }

        if events.is_empty() {
            return Ok(ToolResult {
                call_id: String::new(),
                success: true,
                output: format!("No events scheduled from {start_date} to {end_date}."),
                data: Some(serde_json::json!({ "event_ids": [] })),
            });
        }

        events.sort_by_key(|e| e.start.local_date());

        let event_ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        let mut output = format!("Schedule from {start_date} to {end_date}:\n");
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
