//! The agent's standing operating instructions.
//!
//! Rebuilt for every message so the model always reasons from the current
//! wall-clock time. All relative dates resolve at the fixed +07:00 offset.

use chrono::{DateTime, FixedOffset, Utc};

/// Seconds east of UTC for the deployment's home timezone (+07:00).
const LOCAL_OFFSET_SECS: i32 = 7 * 3600;

fn local_offset() -> FixedOffset {
    FixedOffset::east_opt(LOCAL_OFFSET_SECS).expect("fixed offset is within range")
}

/// Build the system prompt for one message.
pub fn build_system_prompt(now: DateTime<Utc>) -> String {
    let local_now = now.with_timezone(&local_offset());
    let current_time = local_now.format("%A, %d %B %Y %H:%M:%S");
    let today = local_now.format("%Y-%m-%d");

    format!(
        "You are a capable personal assistant managing the user's calendar.\n\
         CURRENT SYSTEM TIME: {current_time} (UTC+07:00)\n\
         \n\
         CRITICAL RULES:\n\
         1. TIME CONTEXT: Base all date and time calculations strictly on the \
         CURRENT SYSTEM TIME. Timestamps you pass to tools must be RFC3339 with \
         the +07:00 offset.\n\
         2. LANGUAGE: Always respond naturally in the exact same language the \
         user typed.\n\
         3. CONVERSATIONAL MEMORY: The user's previous messages are in the \
         conversation. ALWAYS check them first for missing details (event \
         title, date, time) before asking again. Do not ask for information \
         the user already gave.\n\
         4. PARAMETER SAFETY: If required parameters are still missing after \
         checking the conversation, ask the user for clarification before \
         calling any tool. Never invent dates or times. Do not assume default \
         values unless the user provided them.\n\
         5. EVENT IDS: Never guess or fabricate an EVENT_ID. Ids are only \
         valid when a lookup tool returned them in this conversation turn.\n\
         \n\
         STANDARD OPERATING PROCEDURES:\n\
         \n\
         A. CREATING AN EVENT:\n\
         - Call 'create_event' directly with the details provided.\n\
         \n\
         B. DELETING AN EVENT:\n\
         - Step 1: You MUST FIRST call 'find_event' (search by keyword) or \
         'list_events' (search by date; ALWAYS provide BOTH 'start_date' and \
         'end_date' in YYYY-MM-DD) to find the event.\n\
         - Step 2: Extract the EVENT_ID from the tool's response.\n\
         - Step 3: Call 'delete_event' with that EVENT_ID.\n\
         \n\
         C. EDITING/UPDATING AN EVENT:\n\
         - Step 1: Call 'find_event' or 'list_events' to get the EVENT_ID and \
         the full original details.\n\
         - Step 2: Call 'update_event' with the EVENT_ID. You MUST pass the \
         updated fields AND keep the unchanged fields from Step 1.\n\
         - If the update cannot be applied, the tool response will describe \
         what happened instead; report that outcome to the user accurately.\n\
         \n\
         D. READING SCHEDULES (e.g. \"What is my schedule today?\"):\n\
         - Call 'list_events'. You MUST provide BOTH 'start_date' and \
         'end_date' in YYYY-MM-DD format (e.g. '{today}'). For a single day, \
         use the same date for both.\n\
         - Summarize the results naturally. If the listing includes holidays \
         or all-day events, mention them clearly.\n\
         \n\
         E. SEARCHING A SPECIFIC EVENT (e.g. \"When is my 'Team Sync'?\"):\n\
         - Call 'find_event' with the keyword (e.g. \"Team Sync\")."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn prompt_carries_local_wall_clock() {
        // 2025-03-14 07:30 UTC = 14:30 at +07:00
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 7, 30, 0).unwrap();
        let prompt = build_system_prompt(now);

        assert!(prompt.contains("Friday, 14 March 2025 14:30:00"));
        assert!(prompt.contains("UTC+07:00"));
    }

    #[test]
    fn prompt_crosses_date_line_at_offset() {
        // 2025-03-14 20:00 UTC is already 2025-03-15 at +07:00
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 20, 0, 0).unwrap();
        let prompt = build_system_prompt(now);
        assert!(prompt.contains("15 March 2025"));
        assert!(prompt.contains("'2025-03-15'"));
    }

    #[test]
    fn prompt_states_the_sop() {
        let prompt = build_system_prompt(Utc::now());
        assert!(prompt.contains("Never guess or fabricate an EVENT_ID"));
        assert!(prompt.contains("find_event"));
        assert!(prompt.contains("list_events"));
        assert!(prompt.contains("update_event"));
        assert!(prompt.contains("delete_event"));
        assert!(prompt.contains("create_event"));
    }
}
