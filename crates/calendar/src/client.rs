//! Calendar REST client.
//!
//! Thin, typed wrapper over the calendar service's events API. Each method
//! is one request/response pair with a bounded timeout; a timeout resolves
//! to [`CalendarError::Timeout`] and is handled upstream by the agent loop.
//! Credential acquisition (OAuth token refresh etc.) is an external
//! collaborator's job — this client just carries the bearer token it is
//! given.

use chrono::{DateTime, FixedOffset};
use daybook_core::error::CalendarError;
use tracing::{debug, warn};

use crate::types::{CalendarEvent, EventDraft, EventPatch};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Cap on events per listing, to keep tool output within token budget.
const MAX_LIST_RESULTS: u32 = 50;
const MAX_SEARCH_RESULTS: u32 = 10;

/// Typed client for the calendar service.
pub struct CalendarClient {
    base_url: String,
    calendar_id: String,
    access_token: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl std::fmt::Debug for CalendarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarClient")
            .field("base_url", &self.base_url)
            .field("calendar_id", &self.calendar_id)
            .field("access_token", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl CalendarClient {
    /// Create a new client for the given calendar.
    pub fn new(
        calendar_id: impl Into<String>,
        access_token: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: DEFAULT_BASE_URL.into(),
            calendar_id: calendar_id.into(),
            access_token: access_token.into(),
            client,
            timeout_secs,
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencode(calendar_id)
        )
    }

    fn map_request_error(&self, e: reqwest::Error) -> CalendarError {
        if e.is_timeout() {
            CalendarError::Timeout(self.timeout_secs)
        } else {
            CalendarError::Network(e.to_string())
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, CalendarError> {
        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status, body = %body, "Calendar API error");

        if status == 404 || status == 410 {
            return Err(CalendarError::EventNotFound(body));
        }

        Err(CalendarError::Api {
            status_code: status,
            message: body,
        })
    }

    /// List events in a time range on the primary calendar, expanded to
    /// single instances and ordered by start time.
    pub async fn list_range(
        &self,
        time_min: DateTime<FixedOffset>,
        time_max: DateTime<FixedOffset>,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let calendar_id = self.calendar_id.clone();
        self.list_range_in(&calendar_id, time_min, time_max).await
    }

    /// List events in a time range on a specific calendar.
    pub async fn list_range_in(
        &self,
        calendar_id: &str,
        time_min: DateTime<FixedOffset>,
        time_max: DateTime<FixedOffset>,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        debug!(calendar = %calendar_id, %time_min, %time_max, "Listing events");

        let response = self
            .client
            .get(self.events_url(calendar_id))
            .bearer_auth(&self.access_token)
            .query(&[
                ("timeMin", time_min.to_rfc3339()),
                ("timeMax", time_max.to_rfc3339()),
                ("maxResults", MAX_LIST_RESULTS.to_string()),
                ("singleEvents", "true".into()),
                ("orderBy", "startTime".into()),
            ])
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let response = Self::check_status(response).await?;
        let page: EventsPage = response
            .json()
            .await
            .map_err(|e| CalendarError::InvalidEvent(format!("Failed to parse listing: {e}")))?;

        Ok(page.items)
    }

    /// Free-text search on the primary calendar, ordered by start time.
    pub async fn search(&self, keyword: &str) -> Result<Vec<CalendarEvent>, CalendarError> {
        debug!(keyword = %keyword, "Searching events");

        let response = self
            .client
            .get(self.events_url(&self.calendar_id))
            .bearer_auth(&self.access_token)
            .query(&[
                ("q", keyword.to_string()),
                ("maxResults", MAX_SEARCH_RESULTS.to_string()),
                ("singleEvents", "true".into()),
                ("orderBy", "startTime".into()),
            ])
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let response = Self::check_status(response).await?;
        let page: EventsPage = response
            .json()
            .await
            .map_err(|e| CalendarError::InvalidEvent(format!("Failed to parse search: {e}")))?;

        Ok(page.items)
    }

    /// Create a new event; returns the created event with its assigned id.
    pub async fn insert(&self, draft: &EventDraft) -> Result<CalendarEvent, CalendarError> {
        debug!(summary = %draft.summary, "Creating event");

        let response = self
            .client
            .post(self.events_url(&self.calendar_id))
            .bearer_auth(&self.access_token)
            .json(draft)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| CalendarError::InvalidEvent(format!("Failed to parse created event: {e}")))
    }

    /// Apply a partial update to an event.
    pub async fn patch(
        &self,
        event_id: &str,
        patch: &EventPatch,
    ) -> Result<CalendarEvent, CalendarError> {
        if patch.is_empty() {
            return Err(CalendarError::InvalidEvent(
                "Update contains no changed fields".into(),
            ));
        }

        debug!(event_id = %event_id, "Updating event");

        let url = format!(
            "{}/{}",
            self.events_url(&self.calendar_id),
            urlencode(event_id)
        );
        let response = self
            .client
            .patch(url)
            .bearer_auth(&self.access_token)
            .json(patch)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| CalendarError::InvalidEvent(format!("Failed to parse updated event: {e}")))
    }

    /// Delete an event by id.
    pub async fn delete(&self, event_id: &str) -> Result<(), CalendarError> {
        debug!(event_id = %event_id, "Deleting event");

        let url = format!(
            "{}/{}",
            self.events_url(&self.calendar_id),
            urlencode(event_id)
        );
        let response = self
            .client
            .delete(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        Self::check_status(response).await?;
        Ok(())
    }
}

/// Percent-encode a path segment (calendar and event ids may contain
/// `@` and `#`, e.g. holiday calendar ids).
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[derive(Debug, serde::Deserialize)]
struct EventsPage {
    #[serde(default)]
    items: Vec<CalendarEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor() {
        let client = CalendarClient::new("primary", "tok", 30);
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
        assert_eq!(client.calendar_id, "primary");
        assert_eq!(client.timeout_secs, 30);
    }

    #[test]
    fn constructor_with_base_url() {
        let client =
            CalendarClient::new("primary", "tok", 30).with_base_url("http://localhost:9090/");
        assert_eq!(client.base_url, "http://localhost:9090");
    }

    #[test]
    fn debug_redacts_token() {
        let client = CalendarClient::new("primary", "very-secret-token", 30);
        let debug = format!("{client:?}");
        assert!(!debug.contains("very-secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn events_url_encodes_calendar_id() {
        let client = CalendarClient::new("primary", "tok", 30);
        let url = client.events_url("id.holiday#group@calendar.example.com");
        assert!(url.contains("id.holiday%23group%40calendar.example.com"));
        assert!(!url.contains('#'));
    }

    #[test]
    fn urlencode_passes_safe_chars() {
        assert_eq!(urlencode("abc-123_XY.z~"), "abc-123_XY.z~");
        assert_eq!(urlencode("a b"), "a%20b");
    }

    #[test]
    fn events_page_parses_empty_listing() {
        let page: EventsPage = serde_json::from_str(r#"{"kind": "calendar#events"}"#).unwrap();
        assert!(page.items.is_empty());
    }

    #[test]
    fn events_page_parses_items() {
        let page: EventsPage = serde_json::from_str(
            r#"{
                "items": [
                    {
                        "id": "evt_1",
                        "summary": "Dentist",
                        "start": {"dateTime": "2025-03-14T10:00:00+07:00"},
                        "end": {"dateTime": "2025-03-14T11:00:00+07:00"}
                    }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "evt_1");
    }
}
