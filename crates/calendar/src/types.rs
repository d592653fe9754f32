//! Calendar event wire types.
//!
//! These map the calendar service's payloads: an event boundary is either a
//! timed `dateTime` (RFC3339 with offset) or an all-day `date`, never both.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// One boundary (start or end) of an event.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    /// Set for timed events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<FixedOffset>>,

    /// Set for all-day events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl EventTime {
    /// A timed boundary.
    pub fn timed(dt: DateTime<FixedOffset>) -> Self {
        Self {
            date_time: Some(dt),
            date: None,
        }
    }

    /// An all-day boundary.
    pub fn all_day(date: NaiveDate) -> Self {
        Self {
            date_time: None,
            date: Some(date),
        }
    }

    pub fn is_all_day(&self) -> bool {
        self.date.is_some() && self.date_time.is_none()
    }

    /// The local date this boundary falls on, if known.
    pub fn local_date(&self) -> Option<NaiveDate> {
        self.date
            .or_else(|| self.date_time.map(|dt| dt.date_naive()))
    }

    /// Short `HH:MM` label for timed boundaries.
    pub fn time_label(&self) -> Option<String> {
        self.date_time.map(|dt| dt.format("%H:%M").to_string())
    }
}

/// An event as returned by the calendar service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    /// Opaque id assigned by the service.
    pub id: String,

    /// Event title. The service omits it for untitled events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    pub start: EventTime,

    pub end: EventTime,
}

impl CalendarEvent {
    pub fn title(&self) -> &str {
        self.summary.as_deref().unwrap_or("Untitled Event")
    }

    pub fn is_all_day(&self) -> bool {
        self.start.is_all_day()
    }

    /// One human-readable schedule line: `[2025-03-14] Team Sync (14:00 - 15:00)`.
    pub fn schedule_line(&self) -> String {
        let date = self
            .start
            .local_date()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "????-??-??".into());

        let time = match (self.start.time_label(), self.end.time_label()) {
            (Some(s), Some(e)) => format!("{s} - {e}"),
            _ => "All-day".into(),
        };

        format!("[{date}] {} ({time})", self.title())
    }
}

/// Payload for creating a new event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub summary: String,

    pub start: EventTime,

    pub end: EventTime,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Partial update payload — only the set fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<EventTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.description.is_none()
            && self.location.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_timed_event() {
        let event: CalendarEvent = serde_json::from_str(
            r#"{
                "id": "evt_abc",
                "summary": "Team Sync",
                "start": {"dateTime": "2025-03-14T14:00:00+07:00"},
                "end": {"dateTime": "2025-03-14T15:00:00+07:00"}
            }"#,
        )
        .unwrap();

        assert_eq!(event.id, "evt_abc");
        assert_eq!(event.title(), "Team Sync");
        assert!(!event.is_all_day());
        assert_eq!(
            event.schedule_line(),
            "[2025-03-14] Team Sync (14:00 - 15:00)"
        );
    }

    #[test]
    fn parse_all_day_event() {
        let event: CalendarEvent = serde_json::from_str(
            r#"{
                "id": "evt_holiday",
                "summary": "Independence Day",
                "start": {"date": "2025-08-17"},
                "end": {"date": "2025-08-18"}
            }"#,
        )
        .unwrap();

        assert!(event.is_all_day());
        assert_eq!(
            event.schedule_line(),
            "[2025-08-17] Independence Day (All-day)"
        );
    }

    #[test]
    fn untitled_event_gets_placeholder() {
        let event: CalendarEvent = serde_json::from_str(
            r#"{
                "id": "evt_1",
                "start": {"date": "2025-01-01"},
                "end": {"date": "2025-01-02"}
            }"#,
        )
        .unwrap();
        assert_eq!(event.title(), "Untitled Event");
    }

    #[test]
    fn draft_serializes_camel_case() {
        let offset = crate::time::local_offset();
        let start = chrono::NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap()
            .and_local_timezone(offset)
            .unwrap();

        let draft = EventDraft {
            summary: "Team Sync".into(),
            start: EventTime::timed(start),
            end: EventTime::timed(start + chrono::Duration::hours(1)),
            description: None,
            location: None,
        };

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["summary"], "Team Sync");
        assert!(json["start"]["dateTime"].is_string());
        assert!(json.get("description").is_none());
    }

    #[test]
    fn patch_skips_unset_fields() {
        let patch = EventPatch {
            summary: Some("Renamed".into()),
            ..EventPatch::default()
        };
        let json = serde_json::to_string(&patch).unwrap();
        assert!(json.contains("Renamed"));
        assert!(!json.contains("start"));
        assert!(!json.contains("location"));

        assert!(EventPatch::default().is_empty());
        assert!(!patch.is_empty());
    }
}
