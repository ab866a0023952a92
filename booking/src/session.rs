//! Booking sessions hosted in the runtime store.
//!
//! A view owns one [`BookingStore`] per visitor. [`book`] drives a store
//! through the whole wizard from a prepared reservation, which is what the
//! command-line entry point and the end-to-end tests do.

use crate::types::{FieldValues, Formule, Sport};
use crate::wizard::{Flow, ProductionWizardEnvironment, WizardAction, WizardReducer, WizardState, WizardStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use wavehub_runtime::{Store, StoreError};

/// Runtime store hosting one booking session
pub type BookingStore = Store<WizardState, WizardAction, ProductionWizardEnvironment, WizardReducer>;

/// Fresh session store over `flow`
#[must_use]
pub fn booking_store(flow: Flow, environment: ProductionWizardEnvironment) -> BookingStore {
    Store::new(WizardState::new(flow), WizardReducer::new(), environment)
}

/// A reservation prepared ahead of time, as raw form input
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationFile {
    /// Activity
    pub sport: Sport,
    /// Package id, e.g. `3jours`
    #[serde(default)]
    pub formule: Option<Formule>,
    /// Day to book
    pub date: NaiveDate,
    /// Form input keyed by field name
    pub fields: FieldValues,
}

/// Type every field, pick the date, and advance until the wizard stops
///
/// Returns the final state; the caller reads the outcome, alert, or field
/// errors from it.
///
/// # Errors
///
/// Returns [`StoreError`] if the store's feedback limit is exceeded.
pub async fn book(store: &BookingStore, reservation: &ReservationFile) -> Result<WizardState, StoreError> {
    store
        .send(WizardAction::Start {
            sport: reservation.sport,
            formule: reservation.formule,
        })
        .await?;
    for (field, value) in &reservation.fields {
        store
            .send(WizardAction::FieldChanged {
                field: *field,
                value: value.clone(),
            })
            .await?;
    }
    store
        .send(WizardAction::SelectDate {
            date: reservation.date,
        })
        .await?;

    let steps = store.state(|state| state.flow().len()).await;
    for _ in 0..steps {
        let before = store.state(WizardState::cursor).await;
        store.send(WizardAction::Advance).await?;
        let (cursor, status) = store.state(|state| (state.cursor(), state.status())).await;
        if status == WizardStatus::Done || cursor == before {
            break;
        }
    }

    Ok(store.state(Clone::clone).await)
}
