//! Environment for the wizard reducer.

use crate::availability::AvailabilityChecker;
use crate::calendar::DateWindow;
use crate::gateway::BookingBackend;
use chrono_tz::Tz;
use std::sync::Arc;
use wavehub_core::environment::Clock;

/// Dependencies the wizard reducer needs.
pub trait WizardEnvironment: Send + Sync {
    /// Clock for "today".
    ///
    /// Production uses `SystemClock`, tests use `FixedClock`.
    fn clock(&self) -> &dyn Clock;

    /// Per-day capacity lookup
    fn availability(&self) -> &AvailabilityChecker;

    /// Where complete reservations go
    fn gateway(&self) -> Arc<dyn BookingBackend>;

    /// Days a visitor may book, as of now
    fn date_window(&self) -> DateWindow;
}

/// Environment wired to real or in-memory backends
#[derive(Clone)]
pub struct ProductionWizardEnvironment {
    clock: Arc<dyn Clock>,
    availability: AvailabilityChecker,
    gateway: Arc<dyn BookingBackend>,
    timezone: Tz,
    horizon_days: Option<u32>,
}

impl ProductionWizardEnvironment {
    /// Environment with Paris days and no booking horizon
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        availability: AvailabilityChecker,
        gateway: Arc<dyn BookingBackend>,
    ) -> Self {
        Self {
            clock,
            availability,
            gateway,
            timezone: chrono_tz::Europe::Paris,
            horizon_days: None,
        }
    }

    /// Compute "today" in `timezone`
    #[must_use]
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Refuse dates more than `days` after today
    #[must_use]
    pub fn with_horizon(mut self, days: Option<u32>) -> Self {
        self.horizon_days = days;
        self
    }
}

impl WizardEnvironment for ProductionWizardEnvironment {
    fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    fn availability(&self) -> &AvailabilityChecker {
        &self.availability
    }

    fn gateway(&self) -> Arc<dyn BookingBackend> {
        Arc::clone(&self.gateway)
    }

    fn date_window(&self) -> DateWindow {
        let today = self
            .clock
            .now()
            .with_timezone(&self.timezone)
            .date_naive();
        DateWindow::new(today, self.horizon_days)
    }
}
