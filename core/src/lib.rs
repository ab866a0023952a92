//! # Wave Sport Hub Core
//!
//! Core traits and types shared by the booking workspace.
//!
//! The booking flow is modelled as a reducer: every user interaction is an
//! action, the reducer updates the reservation state in place and describes
//! the I/O it needs (calendar lookups, reservation posts) as effects. The
//! runtime crate executes those effects and feeds their results back.
//!
//! ## Core Concepts
//!
//! - **State**: the in-progress reservation and the wizard position
//! - **Action**: user intents and backend results
//! - **Reducer**: `(State, Action, Environment) -> (State, Effects)`
//! - **Effect**: a description of asynchronous work, not its execution
//! - **Environment**: injected dependencies (clock, backends)
//!
//! ## Example
//!
//! ```
//! use wavehub_core::{effect::Effect, reducer::Reducer, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct StepState {
//!     step: usize,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum StepAction {
//!     Next,
//! }
//!
//! struct StepReducer;
//!
//! impl Reducer for StepReducer {
//!     type State = StepState;
//!     type Action = StepAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut StepState,
//!         action: StepAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<StepAction>; 4]> {
//!         match action {
//!             StepAction::Next => state.step += 1,
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! let mut state = StepState::default();
//! let effects = StepReducer.reduce(&mut state, StepAction::Next, &());
//! assert_eq!(state.step, 1);
//! assert!(effects.is_empty());
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use smallvec::{SmallVec, smallvec};

/// Reducer module - the trait every state machine implements
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// Implementations must not perform I/O. Anything asynchronous is
        /// returned as an [`Effect`] and executed by the runtime, which
        /// feeds the resulting action back into this method.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - side effect descriptions
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed by the reducer. They are returned to the
    /// runtime, which awaits them and dispatches any produced action.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Wrap an async computation that always yields an action
        #[must_use]
        pub fn task<F>(future: F) -> Self
        where
            F: Future<Output = Action> + Send + 'static,
            Action: 'static,
        {
            Effect::Future(Box::pin(async move { Some(future.await) }))
        }

        /// Short name of the variant, used as a metrics label
        #[must_use]
        pub const fn kind(&self) -> &'static str {
            match self {
                Effect::None => "none",
                Effect::Future(_) => "future",
            }
        }
    }
}

/// Environment module - dependency injection traits
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// "Today" in the booking flow (birth date checks, past-date rejection)
    /// is always derived from an injected clock, never read directly.
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use super::environment::{Clock, SystemClock};

    #[derive(Debug, Clone, PartialEq)]
    enum Ping {
        Pong,
    }

    #[test]
    fn effect_debug_hides_future_body() {
        let effect = Effect::task(async { Ping::Pong });
        assert_eq!(format!("{effect:?}"), "Effect::Future(<future>)");
    }

    #[test]
    fn effect_kind_labels() {
        assert_eq!(Effect::<Ping>::None.kind(), "none");
        assert_eq!(Effect::task(async { Ping::Pong }).kind(), "future");
    }

    #[test]
    fn task_always_yields_its_action() {
        let Effect::Future(fut) = Effect::task(async { Ping::Pong }) else {
            unreachable!("task builds a future effect");
        };
        assert_eq!(tokio_test::block_on(fut), Some(Ping::Pong));
    }

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
