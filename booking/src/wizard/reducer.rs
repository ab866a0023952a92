//! Reducer for the reservation wizard.

use crate::availability::Availability;
use crate::error::{Alert, AlertKind, BookingError};
use crate::gateway::{self, ReservationRequest, SubmissionReceipt};
use crate::types::{Field, FieldErrors, ReservationPatch};
use crate::validation::ValidationContext;
use crate::wizard::environment::{ProductionWizardEnvironment, WizardEnvironment};
use crate::wizard::{Outcome, WizardAction, WizardState, WizardStatus};
use chrono::NaiveDate;
use smallvec::{SmallVec, smallvec};
use wavehub_core::{effect::Effect, reducer::Reducer};

type Effects = SmallVec<[Effect<WizardAction>; 4]>;

/// Reducer driving one booking session.
///
/// Steps forward only when the active step validates, keeps every typed
/// value when stepping back, and on the last step runs the capacity check
/// followed by the submission. Backend failures become alerts; the user
/// stays on the last step and may retry.
pub struct WizardReducer;

impl WizardReducer {
    /// Create a new wizard reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for WizardReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for WizardReducer {
    type State = WizardState;
    type Action = WizardAction;
    type Environment = ProductionWizardEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            WizardAction::Start { sport, formule } => {
                *state = WizardState::new(state.flow.clone());
                let formule = formule.filter(|formule| {
                    let offered = sport.offers(*formule);
                    if !offered {
                        tracing::warn!(%sport, formule = formule.id(), "Package not offered for sport, ignoring");
                    }
                    offered
                });
                state.store.update(ReservationPatch {
                    sport: Some(sport),
                    formule,
                    ..ReservationPatch::default()
                });
                tracing::info!(%sport, formule = formule.map(|f| f.id()), "Booking started");
                SmallVec::new()
            },

            WizardAction::FieldChanged { field, value } => {
                state.inputs.insert(field, value);
                state.touched.insert(field);
                revalidate_touched(state, env);
                SmallVec::new()
            },

            WizardAction::SelectDate { date } => {
                state
                    .inputs
                    .insert(Field::SelectedDate, date.format("%Y-%m-%d").to_string());
                state.touched.insert(Field::SelectedDate);
                if state
                    .alert
                    .as_ref()
                    .is_some_and(|alert| alert.kind == AlertKind::DayFull)
                {
                    state.alert = None;
                }
                revalidate_touched(state, env);
                SmallVec::new()
            },

            WizardAction::Advance => advance(state, env),

            WizardAction::Retreat => {
                if state.status.in_flight() || state.status == WizardStatus::Done {
                    tracing::debug!(status = ?state.status, "Retreat ignored");
                    return SmallVec::new();
                }
                if state.cursor > 0 {
                    state.cursor -= 1;
                    state.field_errors = FieldErrors::new();
                    state.alert = None;
                }
                SmallVec::new()
            },

            WizardAction::DismissAlert => {
                state.alert = None;
                SmallVec::new()
            },

            WizardAction::Leave => {
                tracing::info!(stage = ?state.current_stage(), "Booking abandoned");
                *state = WizardState::new(state.flow.clone());
                SmallVec::new()
            },

            WizardAction::CapacityChecked { date, result } => capacity_checked(state, env, date, result),

            WizardAction::SubmissionFinished { result } => submission_finished(state, result),
        }
    }
}

fn validation_context(state: &WizardState, env: &impl WizardEnvironment) -> ValidationContext {
    ValidationContext {
        sport: state.record().sport,
        window: env.date_window(),
    }
}

/// Live validation: errors of the active step, for fields the user touched
fn revalidate_touched(state: &mut WizardState, env: &impl WizardEnvironment) {
    let Some(schema) = state.current_stage().schema() else {
        return;
    };
    let ctx = validation_context(state, env);
    let mut errors = match schema.validate(&state.inputs, &ctx) {
        Ok(_) => FieldErrors::new(),
        Err(errors) => errors,
    };
    errors.retain(|field| state.touched.contains(&field));
    state.field_errors = errors;
}

fn advance(state: &mut WizardState, env: &impl WizardEnvironment) -> Effects {
    if state.status.in_flight() || state.status == WizardStatus::Done {
        tracing::debug!(status = ?state.status, "Advance ignored");
        return SmallVec::new();
    }
    let stage = state.current_stage();
    let Some(schema) = stage.schema() else {
        return SmallVec::new();
    };

    let ctx = validation_context(state, env);
    match schema.validate(&state.inputs, &ctx) {
        Err(errors) => {
            tracing::debug!(?stage, invalid = errors.len(), "Step rejected");
            state.touched.extend(schema.fields().iter().copied());
            state.field_errors = errors;
            return SmallVec::new();
        },
        Ok(patch) => {
            state.store.update(patch);
            state.field_errors = FieldErrors::new();
            state.alert = None;
        },
    }

    if !state.is_last_stage() {
        state.cursor += 1;
        tracing::debug!(from = ?stage, to = ?state.current_stage(), "Step completed");
        // The next step may own fields typed earlier
        revalidate_touched(state, env);
        return SmallVec::new();
    }

    // Terminal step: the date must still be bookable, even if the page has
    // been open since yesterday
    let Some(date) = confirmable_date(state, &ctx) else {
        return SmallVec::new();
    };
    if let Err(incomplete) = state.record().complete() {
        tracing::warn!(missing = ?incomplete.missing, "Record incomplete at confirmation");
        state.alert = Some(Alert::incomplete(format!(
            "Il manque des informations pour réserver : {}",
            incomplete.missing.join(", ")
        )));
        return SmallVec::new();
    }

    state.status = WizardStatus::CheckingAvailability;
    let checker = env.availability().clone();
    smallvec![Effect::task(async move {
        let result = checker.check_capacity(date).await;
        WizardAction::CapacityChecked { date, result }
    })]
}

/// The record's date, if it is still inside the window
fn confirmable_date(state: &mut WizardState, ctx: &ValidationContext) -> Option<NaiveDate> {
    let Some(date) = state.record().selected_date else {
        state.field_errors.insert(Field::SelectedDate, "Veuillez sélectionner une date");
        state.alert = Some(Alert::incomplete("Veuillez sélectionner une date"));
        return None;
    };
    match ctx.window.select(date) {
        Ok(date) => Some(date),
        Err(rejected) => {
            tracing::info!(%date, reason = %rejected, "Date no longer bookable");
            state.field_errors.insert(Field::SelectedDate, rejected.message());
            state.alert = Some(Alert::incomplete(rejected.message()));
            None
        },
    }
}

fn capacity_checked(
    state: &mut WizardState,
    env: &impl WizardEnvironment,
    date: NaiveDate,
    result: Result<Availability, BookingError>,
) -> Effects {
    if state.status != WizardStatus::CheckingAvailability {
        tracing::debug!(status = ?state.status, "Stale capacity result ignored");
        return SmallVec::new();
    }
    if state.record().selected_date != Some(date) {
        tracing::debug!(%date, selected = ?state.record().selected_date, "Capacity result for another day ignored");
        return SmallVec::new();
    }

    let availability = match result {
        Ok(availability) => availability,
        Err(error) => {
            state.status = WizardStatus::Editing;
            state.alert = Alert::for_error(&error);
            return SmallVec::new();
        },
    };

    if !availability.allowed {
        state.status = WizardStatus::Editing;
        state.alert = Alert::for_error(&BookingError::CapacityExceeded {
            date,
            attendees: availability.current_attendees,
            ceiling: availability.ceiling,
        });
        return SmallVec::new();
    }

    let reservation = match state.record().complete() {
        Ok(reservation) => reservation,
        Err(incomplete) => {
            state.status = WizardStatus::Editing;
            state.alert = Some(Alert::incomplete(incomplete.to_string()));
            return SmallVec::new();
        },
    };

    state.status = WizardStatus::Submitting;
    let request = ReservationRequest::from_reservation(&reservation);
    let backend = env.gateway();
    smallvec![Effect::task(async move {
        let result = gateway::deliver(backend, request).await;
        WizardAction::SubmissionFinished { result }
    })]
}

fn submission_finished(
    state: &mut WizardState,
    result: Result<SubmissionReceipt, BookingError>,
) -> Effects {
    if state.status != WizardStatus::Submitting {
        tracing::debug!(status = ?state.status, "Stale submission result ignored");
        return SmallVec::new();
    }

    match result {
        Ok(SubmissionReceipt::Confirmed { reservation_id }) => {
            state.outcome = Some(Outcome::Confirmed { reservation_id });
            state.alert = None;
        },
        Ok(SubmissionReceipt::Unconfirmed) => {
            state.outcome = Some(Outcome::Unconfirmed);
            state.alert = Some(Alert::unconfirmed());
        },
        Err(error) => {
            state.status = WizardStatus::Editing;
            state.alert = Alert::for_error(&error);
            return SmallVec::new();
        },
    }

    state.status = WizardStatus::Done;
    state.cursor = state.flow.len();
    tracing::info!(outcome = ?state.outcome, "Booking submitted");
    SmallVec::new()
}
