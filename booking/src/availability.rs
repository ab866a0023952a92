//! Per-day capacity check against the school's calendar.
//!
//! The calendar holds one event per booked session; each event lists its
//! attendees. A day is bookable while the attendees of every event
//! overlapping it stay under the ceiling.

use crate::error::BookingError;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Calendar backend result
pub type CalendarResult<T> = Result<T, CalendarError>;

/// Calendar backend failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    /// Network or connection failure
    #[error("calendar request failed: {0}")]
    Transport(String),
    /// Non-success HTTP status
    #[error("calendar answered with status {0}")]
    Status(u16),
    /// Body could not be decoded
    #[error("calendar response could not be decoded: {0}")]
    Decode(String),
}

/// A calendar event, reduced to what capacity needs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarEvent {
    /// Number of attendees on the event
    pub attendees: u32,
}

/// Source of calendar events
pub trait CalendarBackend: Send + Sync {
    /// Events overlapping `[start, end)`
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError`] if the calendar cannot be read.
    fn events_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = CalendarResult<Vec<CalendarEvent>>> + Send>>;
}

// ============================================================================
// Google Calendar v3
// ============================================================================

#[derive(Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<EventItem>,
}

#[derive(Deserialize)]
struct EventItem {
    #[serde(default)]
    attendees: Vec<serde_json::Value>,
}

/// Calendar backend speaking the Google Calendar v3 events API
#[derive(Clone, Debug)]
pub struct GoogleCalendarBackend {
    client: Client,
    api_url: String,
    calendar_id: String,
    api_key: Option<String>,
    access_token: Option<String>,
}

impl GoogleCalendarBackend {
    /// Backend for `calendar_id` under `api_url`
    #[must_use]
    pub fn new(api_url: impl Into<String>, calendar_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            calendar_id: calendar_id.into(),
            api_key: None,
            access_token: None,
        }
    }

    /// Send `key=<api_key>` with every request
    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Authenticate with a bearer token
    #[must_use]
    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = access_token;
        self
    }

    /// `{api_url}/calendars/{calendar_id}/events`, with the id encoded as one
    /// path segment
    fn events_url(&self) -> CalendarResult<Url> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| CalendarError::Transport(format!("invalid calendar url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| CalendarError::Transport(format!("calendar url cannot take a path: {}", self.api_url)))?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events"]);
        Ok(url)
    }
}

impl CalendarBackend for GoogleCalendarBackend {
    fn events_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = CalendarResult<Vec<CalendarEvent>>> + Send>> {
        let url = match self.events_url() {
            Ok(url) => url,
            Err(e) => {
                let failed: CalendarResult<Vec<CalendarEvent>> = Err(e);
                return Box::pin(async move { failed });
            },
        };
        let mut query = vec![
            ("timeMin", start.to_rfc3339()),
            ("timeMax", end.to_rfc3339()),
            ("singleEvents", "true".to_string()),
        ];
        if let Some(key) = &self.api_key {
            query.push(("key", key.clone()));
        }
        let mut request = self.client.get(url).query(&query);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        Box::pin(async move {
            let response = request
                .send()
                .await
                .map_err(|e| CalendarError::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(CalendarError::Status(status.as_u16()));
            }

            let list = response
                .json::<EventList>()
                .await
                .map_err(|e| CalendarError::Decode(e.to_string()))?;

            Ok(list
                .items
                .into_iter()
                .map(|item| CalendarEvent {
                    attendees: u32::try_from(item.attendees.len()).unwrap_or(u32::MAX),
                })
                .collect())
        })
    }
}

// ============================================================================
// In-memory calendar
// ============================================================================

/// Calendar kept in memory, for dry runs and tests
#[derive(Clone, Debug, Default)]
pub struct InMemoryCalendar {
    events: Arc<Mutex<Vec<(DateTime<Utc>, DateTime<Utc>, CalendarEvent)>>>,
    unavailable: bool,
}

impl InMemoryCalendar {
    /// Empty calendar
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calendar whose every read fails
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Add a one-hour session starting at `start`
    pub fn add_event(&self, start: DateTime<Utc>, attendees: u32) {
        self.add_event_until(start, start + chrono::Duration::hours(1), attendees);
    }

    /// Add an event running over `[start, end)`
    pub fn add_event_until(&self, start: DateTime<Utc>, end: DateTime<Utc>, attendees: u32) {
        if let Ok(mut events) = self.events.lock() {
            events.push((start, end, CalendarEvent { attendees }));
        }
    }
}

impl CalendarBackend for InMemoryCalendar {
    fn events_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = CalendarResult<Vec<CalendarEvent>>> + Send>> {
        let result: CalendarResult<Vec<CalendarEvent>> = if self.unavailable {
            Err(CalendarError::Transport("calendar offline".to_string()))
        } else {
            self.events
                .lock()
                .map(|events| {
                    events
                        .iter()
                        .filter(|(from, until, _)| *from < end && *until > start)
                        .map(|(_, _, event)| event.clone())
                        .collect()
                })
                .map_err(|_| CalendarError::Transport("calendar lock poisoned".to_string()))
        };
        Box::pin(async move { result })
    }
}

// ============================================================================
// Capacity
// ============================================================================

/// Default per-day attendee ceiling
pub const DEFAULT_CEILING: u32 = 12;

/// Capacity of one day
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Availability {
    /// Day checked
    pub date: NaiveDate,
    /// Attendees already booked that day
    pub current_attendees: u32,
    /// Per-day ceiling
    pub ceiling: u32,
    /// `current_attendees < ceiling`
    pub allowed: bool,
}

impl Availability {
    /// Compute availability from an attendee count
    #[must_use]
    pub const fn new(date: NaiveDate, current_attendees: u32, ceiling: u32) -> Self {
        Self {
            date,
            current_attendees,
            ceiling,
            allowed: current_attendees < ceiling,
        }
    }
}

/// Answers "can one more visitor book this day?"
#[derive(Clone)]
pub struct AvailabilityChecker {
    backend: Arc<dyn CalendarBackend>,
    ceiling: u32,
    timezone: Tz,
    timeout: Duration,
}

impl AvailabilityChecker {
    /// Checker over `backend`, with the default ceiling, Paris days and a
    /// 10 second timeout
    #[must_use]
    pub fn new(backend: Arc<dyn CalendarBackend>) -> Self {
        Self {
            backend,
            ceiling: DEFAULT_CEILING,
            timezone: chrono_tz::Europe::Paris,
            timeout: Duration::from_secs(10),
        }
    }

    /// Override the ceiling
    #[must_use]
    pub fn with_ceiling(mut self, ceiling: u32) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Override the timezone days are computed in
    #[must_use]
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Override the backend timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured ceiling
    #[must_use]
    pub const fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// `[00:00, next 00:00)` of `date`, in UTC
    ///
    /// # Errors
    ///
    /// Fails only for the last representable date.
    pub fn day_window(&self, date: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>), BookingError> {
        let next = date
            .succ_opt()
            .ok_or_else(|| BookingError::backend(format!("no day after {date}")))?;
        Ok((
            local_midnight(self.timezone, date),
            local_midnight(self.timezone, next),
        ))
    }

    /// Count the day's attendees and compare with the ceiling
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::BackendUnavailable`] if the calendar fails or
    /// does not answer within the timeout. A failure never reads as allowed.
    pub async fn check_capacity(&self, date: NaiveDate) -> Result<Availability, BookingError> {
        let (start, end) = self.day_window(date)?;
        let started = Instant::now();

        let events = tokio::time::timeout(self.timeout, self.backend.events_between(start, end))
            .await
            .map_err(|_| {
                tracing::warn!(%date, timeout_ms = self.timeout.as_millis(), "Calendar request timed out");
                BookingError::backend("calendar request timed out")
            })?
            .map_err(|e| {
                tracing::warn!(%date, error = %e, "Calendar request failed");
                BookingError::backend(e.to_string())
            })?;

        let attendees = events
            .iter()
            .fold(0u32, |total, event| total.saturating_add(event.attendees));
        let availability = Availability::new(date, attendees, self.ceiling);

        metrics::counter!(
            "booking.availability.checks",
            "allowed" => if availability.allowed { "true" } else { "false" }
        )
        .increment(1);
        tracing::info!(
            %date,
            events = events.len(),
            attendees,
            ceiling = self.ceiling,
            allowed = availability.allowed,
            latency_ms = started.elapsed().as_millis(),
            "Capacity checked"
        );

        Ok(availability)
    }
}

impl std::fmt::Debug for AvailabilityChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvailabilityChecker")
            .field("ceiling", &self.ceiling)
            .field("timezone", &self.timezone)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn local_midnight(timezone: Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    timezone
        .from_local_datetime(&naive)
        .earliest()
        .map_or_else(|| naive.and_utc(), |local| local.with_timezone(&Utc))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn july(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }

    fn noon_in_paris(date: NaiveDate) -> DateTime<Utc> {
        // CEST
        date.and_hms_opt(10, 0, 0).unwrap().and_utc()
    }

    fn checker_with(events: &[(NaiveDate, u32)]) -> AvailabilityChecker {
        let calendar = InMemoryCalendar::new();
        for (date, attendees) in events {
            calendar.add_event(noon_in_paris(*date), *attendees);
        }
        AvailabilityChecker::new(Arc::new(calendar))
    }

    #[test]
    fn availability_boundary() {
        assert!(Availability::new(july(1), 11, 12).allowed);
        assert!(!Availability::new(july(1), 12, 12).allowed);
        assert!(!Availability::new(july(1), 40, 12).allowed);
    }

    #[test]
    fn day_window_follows_paris_offset() {
        let checker = AvailabilityChecker::new(Arc::new(InMemoryCalendar::new()));

        let (start, end) = checker.day_window(july(14)).unwrap();

        assert_eq!(start.to_rfc3339(), "2025-07-13T22:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-07-14T22:00:00+00:00");
    }

    #[tokio::test]
    async fn sums_attendees_of_the_day_only() {
        let checker = checker_with(&[(july(14), 6), (july(14), 5), (july(15), 9)]);

        let availability = checker.check_capacity(july(14)).await.unwrap();

        assert_eq!(availability.current_attendees, 11);
        assert!(availability.allowed);
    }

    #[tokio::test]
    async fn events_overlapping_midnight_count_for_the_day() {
        let calendar = InMemoryCalendar::new();
        // 23:00 to 01:00 Paris time, across the start of the 14th
        calendar.add_event_until(
            july(13).and_hms_opt(21, 0, 0).unwrap().and_utc(),
            july(13).and_hms_opt(23, 0, 0).unwrap().and_utc(),
            4,
        );
        // Ends exactly when the 14th starts
        calendar.add_event_until(
            july(13).and_hms_opt(20, 0, 0).unwrap().and_utc(),
            july(13).and_hms_opt(22, 0, 0).unwrap().and_utc(),
            9,
        );
        let checker = AvailabilityChecker::new(Arc::new(calendar));

        let availability = checker.check_capacity(july(14)).await.unwrap();

        assert_eq!(availability.current_attendees, 4);
    }

    #[tokio::test]
    async fn full_day_is_not_allowed() {
        let checker = checker_with(&[(july(14), 8), (july(14), 4)]);

        let availability = checker.check_capacity(july(14)).await.unwrap();

        assert_eq!(availability, Availability::new(july(14), 12, 12));
    }

    #[tokio::test]
    async fn backend_failure_is_unavailable_not_allowed() {
        let checker = AvailabilityChecker::new(Arc::new(InMemoryCalendar::unavailable()));

        let result = checker.check_capacity(july(14)).await;

        assert!(matches!(result, Err(BookingError::BackendUnavailable { .. })));
    }

    #[tokio::test]
    async fn google_backend_counts_attendees() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(query_param("singleEvents", "true"))
            .and(query_param("timeMin", "2025-07-13T22:00:00+00:00"))
            .and(query_param("key", "k-123"))
            .and(header("authorization", "Bearer t-456"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "summary": "Cours", "attendees": [{ "email": "a@b.com" }, { "email": "c@d.com" }] },
                    { "summary": "Sans invités" },
                    { "attendees": [{ "email": "e@f.com" }] }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = GoogleCalendarBackend::new(server.uri(), "primary")
            .with_api_key(Some("k-123".into()))
            .with_access_token(Some("t-456".into()));
        let checker = AvailabilityChecker::new(Arc::new(backend));

        let availability = checker.check_capacity(july(14)).await.unwrap();

        assert_eq!(availability.current_attendees, 3);
    }

    #[tokio::test]
    async fn google_backend_encodes_calendar_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/abc%23holiday@group.v.calendar.google.com/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{ "attendees": [{ "email": "a@b.com" }] }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = GoogleCalendarBackend::new(server.uri(), "abc#holiday@group.v.calendar.google.com");
        let checker = AvailabilityChecker::new(Arc::new(backend));

        let availability = checker.check_capacity(july(14)).await.unwrap();

        assert_eq!(availability.current_attendees, 1);
    }

    #[tokio::test]
    async fn invalid_api_url_is_unavailable() {
        let checker = AvailabilityChecker::new(Arc::new(GoogleCalendarBackend::new("not a url", "primary")));

        let result = checker.check_capacity(july(14)).await;

        assert!(matches!(result, Err(BookingError::BackendUnavailable { reason }) if reason.contains("invalid calendar url")));
    }

    #[tokio::test]
    async fn google_error_status_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let checker = AvailabilityChecker::new(Arc::new(GoogleCalendarBackend::new(server.uri(), "primary")));

        let result = checker.check_capacity(july(14)).await;

        assert!(matches!(result, Err(BookingError::BackendUnavailable { reason }) if reason.contains("403")));
    }

    #[tokio::test]
    async fn slow_calendar_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "items": [] }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let checker = AvailabilityChecker::new(Arc::new(GoogleCalendarBackend::new(server.uri(), "primary")))
            .with_timeout(Duration::from_millis(50));

        let result = checker.check_capacity(july(14)).await;

        assert_eq!(result, Err(BookingError::backend("calendar request timed out")));
    }
}
