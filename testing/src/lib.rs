//! # Wave Sport Hub Testing
//!
//! Testing utilities for the booking workspace.
//!
//! This crate provides:
//! - [`ReducerTest`], a Given-When-Then builder for reducer transitions
//! - Effect assertion helpers
//! - A [`FixedClock`] so "today" is deterministic in date-sensitive tests
//!
//! ## Example
//!
//! ```ignore
//! use wavehub_testing::{test_clock, ReducerTest};
//!
//! ReducerTest::new(WizardReducer::new())
//!     .with_env(test_environment())
//!     .given_state(WizardState::default())
//!     .when_action(WizardAction::Retreat)
//!     .then_state(|state| assert_eq!(state.cursor(), 0))
//!     .run();
//! ```


use chrono::{DateTime, NaiveDate, Utc};
use wavehub_core::environment::Clock;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, NaiveDate, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use wavehub_testing::mocks::FixedClock;
    /// use wavehub_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }

        /// Fixed clock at noon UTC on the given calendar day
        ///
        /// Noon keeps the day identical in every European timezone.
        #[must_use]
        pub fn at_noon(day: NaiveDate) -> Self {
            Self::new(day.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc())
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-06-15 12:00:00 UTC)
    ///
    /// Mid-June, so both past and future dates in the season are easy to
    /// express.
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::at_noon(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap_or_default())
    }
}

/// Install a test-friendly tracing subscriber
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};
