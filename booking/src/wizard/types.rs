//! Wizard state: the step list, the cursor, and everything the view renders.

use crate::error::Alert;
use crate::store::ReservationStore;
use crate::types::{Field, FieldErrors, FieldValues, ReservationRecord};
use crate::validation::StepSchema;
use std::collections::BTreeSet;
use thiserror::Error;

/// A step of the wizard
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Contact form
    CollectingContact,
    /// Rider form
    CollectingRider,
    /// Date picker page
    SelectingDate,
    /// Date picker with capacity check and final confirmation
    Confirming,
    /// Past the last step
    Submitted,
}

impl Stage {
    /// Fields this stage validates on `Advance`
    #[must_use]
    pub const fn schema(self) -> Option<StepSchema> {
        match self {
            Self::CollectingContact => Some(StepSchema::Contact),
            Self::CollectingRider => Some(StepSchema::Rider),
            Self::SelectingDate | Self::Confirming => Some(StepSchema::Schedule),
            Self::Submitted => None,
        }
    }
}

/// Invalid step list
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// No steps at all
    #[error("a flow needs at least one stage")]
    Empty,
    /// The same step twice
    #[error("stage {0:?} appears more than once")]
    Duplicate(Stage),
    /// `Submitted` is implied after the last step
    #[error("Submitted cannot be listed as a stage")]
    ExplicitSubmitted,
}

/// Ordered, non-empty list of wizard steps
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Flow {
    stages: Vec<Stage>,
}

impl Flow {
    /// Build a flow from its steps
    ///
    /// # Errors
    ///
    /// Returns [`FlowError`] if the list is empty, repeats a stage, or
    /// names `Submitted`.
    pub fn new(stages: Vec<Stage>) -> Result<Self, FlowError> {
        if stages.is_empty() {
            return Err(FlowError::Empty);
        }
        let mut seen = BTreeSet::new();
        for stage in &stages {
            if *stage == Stage::Submitted {
                return Err(FlowError::ExplicitSubmitted);
            }
            if !seen.insert(*stage) {
                return Err(FlowError::Duplicate(*stage));
            }
        }
        Ok(Self { stages })
    }

    /// Contact, rider, then date selection with confirmation
    #[must_use]
    pub fn standard() -> Self {
        Self {
            stages: vec![
                Stage::CollectingContact,
                Stage::CollectingRider,
                Stage::Confirming,
            ],
        }
    }

    /// Contact, rider, then a plain date page that submits directly
    #[must_use]
    pub fn with_date_page() -> Self {
        Self {
            stages: vec![
                Stage::CollectingContact,
                Stage::CollectingRider,
                Stage::SelectingDate,
            ],
        }
    }

    /// Steps in order
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Number of steps, excluding `Submitted`
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false; a flow has at least one stage
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage at `cursor`, `Submitted` past the end
    #[must_use]
    pub fn stage(&self, cursor: usize) -> Stage {
        self.stages.get(cursor).copied().unwrap_or(Stage::Submitted)
    }
}

impl Default for Flow {
    fn default() -> Self {
        Self::standard()
    }
}

/// What the wizard is waiting on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WizardStatus {
    /// Waiting for the user
    #[default]
    Editing,
    /// Capacity lookup in flight
    CheckingAvailability,
    /// Submission in flight
    Submitting,
    /// Reservation sent
    Done,
}

impl WizardStatus {
    /// Whether a backend call is pending
    #[must_use]
    pub const fn in_flight(self) -> bool {
        matches!(self, Self::CheckingAvailability | Self::Submitting)
    }
}

/// How the submission ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Acknowledged by the backend
    Confirmed {
        /// Identifier assigned by the backend
        reservation_id: String,
    },
    /// Sent, but not acknowledged
    Unconfirmed,
}

/// State of one booking session
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WizardState {
    pub(crate) flow: Flow,
    pub(crate) cursor: usize,
    pub(crate) store: ReservationStore,
    /// Raw input, kept across steps so going back shows what was typed
    pub(crate) inputs: FieldValues,
    pub(crate) touched: BTreeSet<Field>,
    pub(crate) field_errors: FieldErrors,
    pub(crate) alert: Option<Alert>,
    pub(crate) status: WizardStatus,
    pub(crate) outcome: Option<Outcome>,
}

impl WizardState {
    /// Fresh session over `flow`
    #[must_use]
    pub fn new(flow: Flow) -> Self {
        Self {
            flow,
            ..Self::default()
        }
    }

    /// Reservation gathered so far
    #[must_use]
    pub const fn record(&self) -> &ReservationRecord {
        self.store.record()
    }

    /// The reservation store
    #[must_use]
    pub const fn store(&self) -> &ReservationStore {
        &self.store
    }

    /// Active step
    #[must_use]
    pub fn current_stage(&self) -> Stage {
        self.flow.stage(self.cursor)
    }

    /// Index of the active step
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Step list
    #[must_use]
    pub const fn flow(&self) -> &Flow {
        &self.flow
    }

    /// Messages to show next to fields of the active step
    #[must_use]
    pub const fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    /// Message to show above the form
    #[must_use]
    pub const fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    /// Submission result, once submitted
    #[must_use]
    pub const fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Pending work
    #[must_use]
    pub const fn status(&self) -> WizardStatus {
        self.status
    }

    /// What the user typed in `field`
    #[must_use]
    pub fn input(&self, field: Field) -> Option<&str> {
        self.inputs.get(&field).map(String::as_str)
    }

    pub(crate) fn is_last_stage(&self) -> bool {
        self.cursor + 1 == self.flow.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_rejects_bad_lists() {
        assert_eq!(Flow::new(vec![]), Err(FlowError::Empty));
        assert_eq!(
            Flow::new(vec![Stage::CollectingContact, Stage::CollectingContact]),
            Err(FlowError::Duplicate(Stage::CollectingContact))
        );
        assert_eq!(
            Flow::new(vec![Stage::CollectingContact, Stage::Submitted]),
            Err(FlowError::ExplicitSubmitted)
        );
    }

    #[test]
    fn stage_past_the_end_is_submitted() {
        let flow = Flow::standard();
        assert_eq!(flow.stage(0), Stage::CollectingContact);
        assert_eq!(flow.stage(2), Stage::Confirming);
        assert_eq!(flow.stage(3), Stage::Submitted);
        assert_eq!(Flow::with_date_page().stage(2), Stage::SelectingDate);
    }

    #[test]
    fn single_stage_flow_is_valid() {
        let flow = Flow::new(vec![Stage::Confirming]);
        assert!(flow.is_ok_and(|flow| flow.len() == 1));
    }
}
