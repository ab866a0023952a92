//! Actions for the reservation wizard.

use crate::availability::Availability;
use crate::error::BookingError;
use crate::gateway::SubmissionReceipt;
use crate::types::{Field, Formule, Sport};
use chrono::NaiveDate;

/// Everything that can happen to a booking session.
///
/// The first group comes from the view; the last two are fed back by the
/// effects the reducer starts.
#[derive(Debug, Clone)]
pub enum WizardAction {
    /// Enter the wizard for a sport and, optionally, a package.
    ///
    /// Starts a fresh record.
    Start {
        /// Chosen sport
        sport: Sport,
        /// Chosen package
        formule: Option<Formule>,
    },

    /// The user edited a field
    FieldChanged {
        /// Edited field
        field: Field,
        /// Raw text
        value: String,
    },

    /// The user picked a day in the calendar
    SelectDate {
        /// Picked day
        date: NaiveDate,
    },

    /// Validate the active step and move on; submit from the last step
    Advance,

    /// Go back one step, keeping every value
    Retreat,

    /// Hide the current alert
    DismissAlert,

    /// The user navigated away; the record is discarded
    Leave,

    /// Capacity lookup finished
    CapacityChecked {
        /// Day that was checked
        date: NaiveDate,
        /// Lookup result
        result: Result<Availability, BookingError>,
    },

    /// Submission finished
    SubmissionFinished {
        /// Gateway result
        result: Result<SubmissionReceipt, BookingError>,
    },
}
