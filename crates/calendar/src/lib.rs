//! Calendar service integration for Daybook.
//!
//! [`CalendarClient`] wraps the calendar REST API behind typed request and
//! response structs. The client performs no retries — retry and fallback
//! policy belongs to the agent loop, which keeps this layer deterministic:
//! one call in, one result (or one typed failure) out.

pub mod client;
pub mod time;
pub mod types;

pub use client::CalendarClient;
pub use time::{day_bounds, local_offset, parse_date, LOCAL_OFFSET_SECS};
pub use types::{CalendarEvent, EventDraft, EventPatch, EventTime};
