//! The window of dates a visitor may pick.

use chrono::{Days, NaiveDate};
use thiserror::Error;

/// Why a date was refused
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRejected {
    /// Before today
    #[error("{0} is in the past")]
    Past(NaiveDate),
    /// After the last bookable day
    #[error("{date} is after the last bookable day {last}")]
    BeyondHorizon {
        /// Requested day
        date: NaiveDate,
        /// Last bookable day
        last: NaiveDate,
    },
}

impl DateRejected {
    /// French user-facing message
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Past(_) => "Cette date est déjà passée",
            Self::BeyondHorizon { .. } => "Les réservations ne sont pas encore ouvertes pour cette date",
        }
    }
}

/// Bookable days: today onwards, optionally bounded by a horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    today: NaiveDate,
    horizon_days: Option<u32>,
}

impl DateWindow {
    /// Window starting at `today`, with an optional horizon in days
    #[must_use]
    pub const fn new(today: NaiveDate, horizon_days: Option<u32>) -> Self {
        Self {
            today,
            horizon_days,
        }
    }

    /// First bookable day
    #[must_use]
    pub const fn first(&self) -> NaiveDate {
        self.today
    }

    /// Last bookable day, when a horizon is set
    ///
    /// A horizon past the last representable date leaves the window open.
    #[must_use]
    pub fn last(&self) -> Option<NaiveDate> {
        self.horizon_days
            .and_then(|days| self.today.checked_add_days(Days::new(days.into())))
    }

    /// Accept or reject a date
    ///
    /// # Errors
    ///
    /// Returns [`DateRejected`] when the date lies outside the window.
    pub fn select(&self, date: NaiveDate) -> Result<NaiveDate, DateRejected> {
        if date < self.today {
            return Err(DateRejected::Past(date));
        }
        match self.last() {
            Some(last) if date > last => Err(DateRejected::BeyondHorizon { date, last }),
            _ => Ok(date),
        }
    }
}
