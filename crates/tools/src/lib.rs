//! Built-in calendar tools for the Daybook agent.
//!
//! Five deterministic operations over the calendar service, each exposed to
//! the LLM as a named capability with a declared argument schema:
//!
//! - `list_events` — every event in a date range
//! - `find_event` — resolve a natural-language reference to an event id
//! - `create_event` — add an event
//! - `update_event` — change fields on an existing event
//! - `delete_event` — remove an event
//!
//! Service-level failures come back as unsuccessful [`ToolResult`]s so the
//! agent loop can apply its own recovery policy (retrying reads, swapping
//! failed updates). Argument problems are rejected before any request is
//! sent.
//!
//! [`ToolResult`]: daybook_core::tool::ToolResult

mod create_event;
mod delete_event;
mod find_event;
mod list_events;
mod update_event;

pub use create_event::CreateEventTool;
pub use delete_event::DeleteEventTool;
pub use find_event::FindEventTool;
pub use list_events::ListEventsTool;
pub use update_event::UpdateEventTool;

use std::sync::Arc;

use daybook_calendar::CalendarClient;
use daybook_core::tool::ToolRegistry;

/// Build a registry holding the full calendar tool set.
pub fn calendar_registry(
    client: Arc<CalendarClient>,
    extra_calendars: Vec<String>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ListEventsTool::new(
        client.clone(),
        extra_calendars,
    )));
    registry.register(Box::new(FindEventTool::new(client.clone())));
    registry.register(Box::new(CreateEventTool::new(client.clone())));
    registry.register(Box::new(UpdateEventTool::new(client.clone())));
    registry.register(Box::new(DeleteEventTool::new(client)));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_holds_all_five_tools() {
        let client = Arc::new(CalendarClient::new("primary", "tok", 30));
        let registry = calendar_registry(client, vec![]);

        let mut names = registry.names();
        names.sort();
        assert_eq!(
            names,
            vec![
                "create_event",
                "delete_event",
                "find_event",
                "list_events",
                "update_event"
            ]
        );
    }
}
