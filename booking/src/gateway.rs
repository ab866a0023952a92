//! Submission of a complete reservation to the booking backend.

use crate::error::BookingError;
use crate::types::CompleteReservation;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Gateway result
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Why a submission did not go through
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Network or connection failure
    #[error("reservation request failed: {0}")]
    Transport(String),
    /// No answer within the timeout
    #[error("reservation request timed out")]
    Timeout,
    /// Backend answered with a non-success status
    #[error("reservation rejected with status {status}")]
    Rejected {
        /// HTTP status code
        status: u16,
    },
}

impl From<GatewayError> for BookingError {
    fn from(error: GatewayError) -> Self {
        Self::backend(error.to_string())
    }
}

/// How the backend acknowledged a submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionReceipt {
    /// Stored, with the backend's identifier
    Confirmed {
        /// Identifier assigned by the backend
        reservation_id: String,
    },
    /// Accepted with a success status but no readable acknowledgement
    Unconfirmed,
}

impl SubmissionReceipt {
    /// Metrics label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Confirmed { .. } => "confirmed",
            Self::Unconfirmed => "unconfirmed",
        }
    }
}

/// Body posted to the booking backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRequest {
    /// Lowercase sport identifier
    pub sport: String,
    /// Contact email
    pub email: String,
    /// Booked day, `YYYY-MM-DD`
    pub date: NaiveDate,
    /// Human-readable summary, one fact per line
    pub info: String,
}

impl ReservationRequest {
    /// Build the outbound body for a complete reservation
    #[must_use]
    pub fn from_reservation(reservation: &CompleteReservation) -> Self {
        let contact = &reservation.contact;
        let rider = &reservation.rider;

        let mut lines = vec![format!(
            "Reservation: {} {}",
            contact.first_name, contact.last_name
        )];
        if let Some(formule) = reservation.formule {
            lines.push(format!("Formule: {}", formule.title()));
        }
        lines.extend([
            format!("Address: {}, {}", contact.address, contact.city),
            format!("Phone: {}", contact.phone),
            format!("Rider: {} {}", rider.first_name, rider.last_name),
            format!("Birth Date: {}", rider.birth_date.format("%d/%m/%Y")),
            format!("Height: {}cm", rider.height_cm),
            format!("Weight: {}kg", rider.weight_kg),
            format!("Suit Size: {}", rider.suit_size.label()),
            format!("Shoe Size: {}", rider.shoe_size),
            format!("Level: {}", rider.level.label()),
        ]);

        Self {
            sport: reservation.sport.as_str().to_string(),
            email: contact.email.clone(),
            date: reservation.date,
            info: lines.join("\n"),
        }
    }
}

/// Destination for complete reservations
pub trait BookingBackend: Send + Sync {
    /// Submit one reservation
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the request fails or is rejected.
    fn submit(
        &self,
        request: ReservationRequest,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<SubmissionReceipt>> + Send>>;
}

/// Submit through `backend`, recording the outcome
///
/// # Errors
///
/// Any gateway failure becomes [`BookingError::BackendUnavailable`].
pub async fn deliver(
    backend: Arc<dyn BookingBackend>,
    request: ReservationRequest,
) -> Result<SubmissionReceipt, BookingError> {
    let started = Instant::now();
    let date = request.date;
    let result = backend.submit(request).await;

    let outcome = match &result {
        Ok(receipt) => receipt.label(),
        Err(GatewayError::Rejected { .. }) => "rejected",
        Err(_) => "unavailable",
    };
    metrics::counter!("booking.submissions", "outcome" => outcome).increment(1);

    match result {
        Ok(receipt) => {
            tracing::info!(
                %date,
                outcome,
                latency_ms = started.elapsed().as_millis(),
                "Reservation submitted"
            );
            Ok(receipt)
        },
        Err(error) => {
            tracing::warn!(%date, error = %error, "Reservation submission failed");
            Err(error.into())
        },
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// Posts reservations as JSON to an HTTP endpoint
#[derive(Clone, Debug)]
pub struct HttpBookingGateway {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpBookingGateway {
    /// Gateway posting to `endpoint`
    #[must_use]
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

/// Read a reservation identifier out of a success body
fn acknowledgement(body: &str) -> SubmissionReceipt {
    let Ok(serde_json::Value::Object(fields)) = serde_json::from_str::<serde_json::Value>(body) else {
        return SubmissionReceipt::Unconfirmed;
    };
    ["id", "reservationId"]
        .iter()
        .find_map(|key| match fields.get(*key) {
            Some(serde_json::Value::String(id)) if !id.is_empty() => Some(id.clone()),
            Some(serde_json::Value::Number(id)) => Some(id.to_string()),
            _ => None,
        })
        .map_or(SubmissionReceipt::Unconfirmed, |reservation_id| {
            SubmissionReceipt::Confirmed { reservation_id }
        })
}

impl BookingBackend for HttpBookingGateway {
    fn submit(
        &self,
        request: ReservationRequest,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<SubmissionReceipt>> + Send>> {
        let pending = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&request);

        Box::pin(async move {
            let response = pending.send().await.map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Transport(e.to_string())
                }
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(GatewayError::Rejected {
                    status: status.as_u16(),
                });
            }

            // A body we cannot read still came with a success status
            let body = response.text().await.unwrap_or_default();
            Ok(acknowledgement(&body))
        })
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Keeps every submitted request and answers with a fixed result
#[derive(Clone, Debug)]
pub struct RecordingGateway {
    requests: Arc<Mutex<Vec<ReservationRequest>>>,
    answer: GatewayResult<SubmissionReceipt>,
}

impl RecordingGateway {
    /// Gateway confirming every submission with `reservation_id`
    #[must_use]
    pub fn confirming(reservation_id: impl Into<String>) -> Self {
        Self::answering(Ok(SubmissionReceipt::Confirmed {
            reservation_id: reservation_id.into(),
        }))
    }

    /// Gateway answering every submission with `answer`
    #[must_use]
    pub fn answering(answer: GatewayResult<SubmissionReceipt>) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            answer,
        }
    }

    /// Requests received so far
    #[must_use]
    pub fn requests(&self) -> Vec<ReservationRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl BookingBackend for RecordingGateway {
    fn submit(
        &self,
        request: ReservationRequest,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<SubmissionReceipt>> + Send>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        let answer = self.answer.clone();
        Box::pin(async move { answer })
    }
}
