//! # Wave Sport Hub Booking
//!
//! Reservation core for the Wave Sport Hub water-sports school: a visitor
//! picks a sport and package, fills in a contact step and a rider step,
//! chooses a day, and the reservation is sent once the day is known to have
//! room.
//!
//! ## Modules
//!
//! - [`types`]: sports, packages, levels, form fields and the reservation record
//! - [`catalog`]: activity and package cards
//! - [`store`]: the single owner of the in-progress record
//! - [`validation`]: per-step validation of raw input
//! - [`calendar`]: the window of bookable days
//! - [`availability`]: per-day capacity against the school calendar
//! - [`gateway`]: submission to the booking backend
//! - [`wizard`]: the step machine tying it all together
//! - [`session`]: hosting a wizard in the runtime store
//! - [`config`]: environment configuration
//!
//! ## Example
//!
//! ```ignore
//! use wavehub_booking::session::{booking_store, BookingStore};
//! use wavehub_booking::wizard::{Flow, WizardAction};
//!
//! let store = booking_store(Flow::standard(), environment);
//! let mut snapshots = store.subscribe_state();
//!
//! store.send(WizardAction::Start { sport: Sport::Efoil, formule: None }).await?;
//! assert!(snapshots.has_changed()?);
//! ```

pub mod availability;
pub mod calendar;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod session;
pub mod store;
pub mod types;
pub mod validation;
pub mod wizard;

pub use availability::{Availability, AvailabilityChecker};
pub use config::Config;
pub use error::{Alert, AlertKind, BookingError};
pub use gateway::{ReservationRequest, SubmissionReceipt};
pub use session::{BookingStore, ReservationFile, book, booking_store};
pub use store::ReservationStore;
pub use types::{Field, FieldErrors, Formule, Level, ReservationRecord, Sport, SuitSize};
pub use wizard::{Flow, Outcome, Stage, WizardAction, WizardReducer, WizardState};
