//! Transport-facing text helpers: command replies, the block notice, and
//! message chunking for the platform's length cap.

/// Telegram's hard limit is 4096 characters; we chunk under a safety buffer.
pub const MAX_CHUNK_CHARS: usize = 4000;

/// Static notice shown to a denied sender. Deliberately non-informative.
pub const BLOCK_NOTICE: &str =
    "Access denied. This assistant is exclusively configured for its owner.";

/// Canned replies for the bot commands. Returns `None` for ordinary text,
/// which goes to the agent instead.
pub fn command_reply(text: &str) -> Option<String> {
    match text.trim() {
        "/start" => Some(
            "Hello! I am your personal calendar assistant.\n\n\
             I keep short-term memory of our conversation, so you can give me \
             details step by step — say 'Schedule a meeting tomorrow' and \
             answer my follow-up questions.\n\n\
             I can CREATE, READ, UPDATE and DELETE calendar events. Try:\n\
             - 'Book a Team Sync tomorrow from 2 PM to 3:30 PM'\n\
             - 'What is my schedule for next Monday?'\n\
             - 'Change my Dentist appointment tomorrow to 10 AM'\n\
             - 'Cancel my Team Sync meeting'"
                .into(),
        ),
        "/info" => Some(
            "Daybook — a stateful calendar assistant.\n\n\
             Conversation memory is backed by a SQL store, so multi-turn \
             follow-ups work without repeating yourself. Calendar access is \
             restricted to a single authorized user, and unauthorized \
             attempts are reported.\n\n\
             Type /howtouse for the operation guide."
                .into(),
        ),
        "/howtouse" => Some(
            "Operation guide:\n\n\
             1. MEMORY — I remember the recent conversation. You can give me \
             instructions piece by piece or all at once.\n\n\
             2. FOLLOW-UPS — if details are missing (time, title), I will ask \
             before touching the calendar.\n\n\
             3. COMMANDS — talk to me naturally:\n\
             - CREATE: 'Book a Team Sync tomorrow from 2:00 PM to 3:30 PM.'\n\
             - READ: 'What is my schedule for next Monday?'\n\
             - UPDATE: 'Change my Dentist appointment tomorrow to start at 10 AM.'\n\
             - DELETE: 'Cancel my Team Sync meeting scheduled for tomorrow.'"
                .into(),
        ),
        _ => None,
    }
}

/// Split a reply into chunks under the platform cap, preferring paragraph
/// boundaries so formatting survives.
pub fn chunk_message(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for part in text.split("\n\n") {
        let current_len = current.chars().count();
        let part_len = part.chars().count();

        if current_len + part_len + 2 < max_chars {
            current.push_str(part);
            current.push_str("\n\n");
            continue;
        }

        if !current.trim().is_empty() {
            chunks.push(current.trim_end().to_string());
        }
        current = String::new();

        if part_len >= max_chars {
            // A single paragraph longer than the cap gets hard-split.
            let chars: Vec<char> = part.chars().collect();
            for window in chars.chunks(max_chars - 1) {
                chunks.push(window.iter().collect());
            }
        } else {
            current.push_str(part);
            current.push_str("\n\n");
        }
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim_end().to_string());
    }

    chunks
}
