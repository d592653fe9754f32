//! Fixed-offset time handling for relative-date resolution.
//!
//! All relative day and date arithmetic uses one fixed UTC+07:00 offset.
//! This mirrors the deployment's home timezone and is a deliberate,
//! documented limitation: resolving "tomorrow" against the host's local
//! zone would silently change observable results when the process moves.

use chrono::{DateTime, FixedOffset, NaiveDate};
use daybook_core::error::CalendarError;

/// The fixed local offset, in seconds east of UTC (+07:00).
pub const LOCAL_OFFSET_SECS: i32 = 7 * 3600;

/// The fixed local offset as a chrono type.
pub fn local_offset() -> FixedOffset {
    FixedOffset::east_opt(LOCAL_OFFSET_SECS).expect("fixed offset is within range")
}

/// Parse a `YYYY-MM-DD` date string.
pub fn parse_date(s: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| CalendarError::InvalidEvent(format!("Invalid date '{s}': {e}")))
}

/// The inclusive bounds of a local calendar day: 00:00:00 to 23:59:59
/// at the fixed offset.
pub fn day_bounds(date: NaiveDate) -> (DateTime<FixedOffset>, DateTime<FixedOffset>) {
    let offset = local_offset();
    let start = date
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time")
        .and_local_timezone(offset)
        .single()
        .expect("fixed offsets have no DST gaps");
    let end = date
        .and_hms_opt(23, 59, 59)
        .expect("end of day is a valid time")
        .and_local_timezone(offset)
        .single()
        .expect("fixed offsets have no DST gaps");
    (start, end)
}
