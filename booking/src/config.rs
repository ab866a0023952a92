//! Configuration management for the booking service.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Invalid values are logged and replaced by the default.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Reservation flow settings
    pub booking: BookingConfig,
    /// Calendar backend settings
    pub calendar: CalendarConfig,
}

/// Reservation flow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// URL complete reservations are posted to
    pub endpoint: String,
    /// IANA timezone days are computed in (default: Europe/Paris)
    pub timezone: String,
    /// Maximum attendees per day (default: 12)
    pub capacity_ceiling: u32,
    /// Furthest bookable day, in days from today (default: unbounded)
    pub horizon_days: Option<u32>,
    /// Timeout for calendar and reservation requests in seconds (default: 10)
    pub request_timeout_secs: u64,
}

/// Calendar backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Base URL of the Google Calendar v3 API
    pub api_url: String,
    /// Calendar to read events from
    pub calendar_id: String,
    /// API key sent as `key=`
    pub api_key: Option<String>,
    /// OAuth bearer token
    pub access_token: Option<String>,
}

const DEFAULT_ENDPOINT: &str = "http://localhost:8080/api/reservations";
const DEFAULT_CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";
const DEFAULT_TIMEZONE: &str = "Europe/Paris";

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let timezone = lookup("BOOKING_TIMEZONE")
            .filter(|name| match name.parse::<Tz>() {
                Ok(_) => true,
                Err(_) => {
                    tracing::warn!(key = "BOOKING_TIMEZONE", value = %name, "Unknown timezone, using default");
                    false
                },
            })
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

        Self {
            booking: BookingConfig {
                endpoint: lookup("BOOKING_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
                timezone,
                capacity_ceiling: positive(&lookup, "BOOKING_CAPACITY_CEILING").unwrap_or(12),
                horizon_days: parsed(&lookup, "BOOKING_HORIZON_DAYS"),
                request_timeout_secs: positive(&lookup, "BOOKING_REQUEST_TIMEOUT_SECS").unwrap_or(10),
            },
            calendar: CalendarConfig {
                api_url: lookup("CALENDAR_API_URL").unwrap_or_else(|| DEFAULT_CALENDAR_API.to_string()),
                calendar_id: lookup("CALENDAR_ID").unwrap_or_else(|| "primary".to_string()),
                api_key: lookup("CALENDAR_API_KEY").filter(|key| !key.is_empty()),
                access_token: lookup("CALENDAR_ACCESS_TOKEN").filter(|token| !token.is_empty()),
            },
        }
    }
}

impl BookingConfig {
    /// Timezone as a `chrono_tz` zone
    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone.parse().unwrap_or(chrono_tz::Europe::Paris)
    }

    /// Request timeout
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Parse `key`, warning when it is set but unreadable
fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    let value = raw.trim().parse().ok();
    if value.is_none() {
        tracing::warn!(key, value = %raw, "Invalid configuration value, using default");
    }
    value
}

/// Like [`parsed`], rejecting zero
fn positive<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr + Default + PartialEq,
{
    parsed(lookup, key).filter(|value: &T| {
        let zero = *value == T::default();
        if zero {
            tracing::warn!(key, "Zero is not allowed here, using default");
        }
        !zero
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config(&[]);

        assert_eq!(config.booking.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.booking.timezone(), chrono_tz::Europe::Paris);
        assert_eq!(config.booking.capacity_ceiling, 12);
        assert_eq!(config.booking.horizon_days, None);
        assert_eq!(config.booking.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.calendar.api_url, DEFAULT_CALENDAR_API);
        assert_eq!(config.calendar.calendar_id, "primary");
        assert_eq!(config.calendar.api_key, None);
    }

    #[test]
    fn values_are_read() {
        let config = config(&[
            ("BOOKING_ENDPOINT", "https://example.fr/book"),
            ("BOOKING_TIMEZONE", "Europe/Lisbon"),
            ("BOOKING_CAPACITY_CEILING", "8"),
            ("BOOKING_HORIZON_DAYS", "90"),
            ("CALENDAR_API_KEY", "k-1"),
        ]);

        assert_eq!(config.booking.endpoint, "https://example.fr/book");
        assert_eq!(config.booking.timezone(), chrono_tz::Europe::Lisbon);
        assert_eq!(config.booking.capacity_ceiling, 8);
        assert_eq!(config.booking.horizon_days, Some(90));
        assert_eq!(config.calendar.api_key.as_deref(), Some("k-1"));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config(&[
            ("BOOKING_TIMEZONE", "Mars/Olympus"),
            ("BOOKING_CAPACITY_CEILING", "0"),
            ("BOOKING_REQUEST_TIMEOUT_SECS", "soon"),
            ("BOOKING_HORIZON_DAYS", "-4"),
            ("CALENDAR_ACCESS_TOKEN", ""),
        ]);

        assert_eq!(config.booking.timezone, DEFAULT_TIMEZONE);
        assert_eq!(config.booking.capacity_ceiling, 12);
        assert_eq!(config.booking.request_timeout_secs, 10);
        assert_eq!(config.booking.horizon_days, None);
        assert_eq!(config.calendar.access_token, None);
    }
}
