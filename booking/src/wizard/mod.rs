//! The reservation wizard.
//!
//! A booking session is a reducer over [`WizardState`]. The view sends
//! [`WizardAction`]s to a runtime `Store` and renders from the state's read
//! accessors; the reducer validates the active step, feeds the reservation
//! store, and on the last step describes the capacity check and submission
//! as effects.
//!
//! ```text
//! CollectingContact ─Advance─▶ CollectingRider ─Advance─▶ Confirming ─Advance─▶ check capacity
//!        ▲                          │  ▲                       │                     │
//!        └──────── Retreat ─────────┘  └──────── Retreat ──────┘        full ◀───────┤
//!                                                                   allowed ─▶ submit ─▶ Submitted
//! ```
//!
//! The stage list is data ([`Flow`]), so a flow ending on a plain date page
//! is the same machine with a different list.

pub mod actions;
pub mod environment;
pub mod reducer;
pub mod types;

pub use actions::WizardAction;
pub use environment::{ProductionWizardEnvironment, WizardEnvironment};
pub use reducer::WizardReducer;
pub use types::{Flow, FlowError, Outcome, Stage, WizardState, WizardStatus};
