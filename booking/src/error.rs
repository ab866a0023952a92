//! Booking errors and the user-facing alerts they turn into.

use crate::types::FieldErrors;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors surfaced by the booking flow
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// One or more fields failed validation
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Calendar or reservation backend could not be reached or answered badly
    #[error("Backend unavailable: {reason}")]
    BackendUnavailable {
        /// What went wrong, for logs
        reason: String,
    },

    /// The chosen day already has as many attendees as the ceiling allows
    #[error("{date} is full ({attendees}/{ceiling} attendees)")]
    CapacityExceeded {
        /// Requested day
        date: NaiveDate,
        /// Attendees already booked
        attendees: u32,
        /// Per-day ceiling
        ceiling: u32,
    },

    /// The backend accepted the request but never acknowledged it
    #[error("Reservation sent but not acknowledged by the backend")]
    UnconfirmedSubmission,
}

impl BookingError {
    /// Convenience constructor for backend failures
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            reason: reason.into(),
        }
    }
}

/// Category of a wizard alert
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    /// The selected day has no capacity left
    DayFull,
    /// A backend call failed; the user may retry
    BackendUnavailable,
    /// The reservation was sent but not acknowledged
    Unconfirmed,
    /// The record is missing data or the date is no longer valid
    Incomplete,
}

/// A message shown above the form, dismissible by the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    /// Category
    pub kind: AlertKind,
    /// French user-facing text
    pub message: String,
}

impl Alert {
    /// Alert for a booking error
    ///
    /// Returns `None` for validation errors, which are shown next to their
    /// fields instead.
    #[must_use]
    pub fn for_error(error: &BookingError) -> Option<Self> {
        match error {
            BookingError::Validation(_) => None,
            BookingError::BackendUnavailable { .. } => Some(Self {
                kind: AlertKind::BackendUnavailable,
                message: "Le service de réservation est momentanément indisponible. \
                          Veuillez réessayer."
                    .to_string(),
            }),
            BookingError::CapacityExceeded { date, .. } => Some(Self {
                kind: AlertKind::DayFull,
                message: format!(
                    "Le {} est complet. Veuillez choisir une autre date.",
                    date.format("%d/%m/%Y")
                ),
            }),
            BookingError::UnconfirmedSubmission => Some(Self::unconfirmed()),
        }
    }

    /// Notice shown when the backend did not acknowledge the reservation
    #[must_use]
    pub fn unconfirmed() -> Self {
        Self {
            kind: AlertKind::Unconfirmed,
            message: "Votre demande a été envoyée mais n'a pas encore été confirmée. \
                      Nous vous recontacterons par email."
                .to_string(),
        }
    }

    /// Alert for a record that cannot be submitted yet
    #[must_use]
    pub fn incomplete(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Incomplete,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_do_not_become_alerts() {
        assert_eq!(Alert::for_error(&BookingError::Validation(FieldErrors::new())), None);
    }

    #[test]
    fn capacity_alert_names_the_day() {
        let error = BookingError::CapacityExceeded {
            date: NaiveDate::from_ymd_opt(2025, 7, 14).unwrap_or_default(),
            attendees: 12,
            ceiling: 12,
        };

        let alert = Alert::for_error(&error);

        assert!(matches!(alert, Some(Alert { kind: AlertKind::DayFull, ref message }) if message.contains("14/07/2025")));
        assert_eq!(error.to_string(), "2025-07-14 is full (12/12 attendees)");
    }

    #[test]
    fn backend_failures_map_to_retryable_alert() {
        let alert = Alert::for_error(&BookingError::backend("timeout"));
        assert_eq!(alert.map(|a| a.kind), Some(AlertKind::BackendUnavailable));
    }
}
