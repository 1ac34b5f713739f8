//! Clock abstraction for the scheduler.
//!
//! Everything that asks "is this task due yet?" goes through a [`Clock`] so
//! that tests can drive time by hand instead of sleeping.

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Mutex;

/// A source of calendar time for the scheduler.
pub trait Clock: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Signed time remaining until `target`: positive while the target is in
    /// the future, zero or negative once it is due.
    fn until(&self, target: DateTime<Utc>) -> TimeDelta {
        target.signed_duration_since(self.now())
    }
}

impl<C: Clock> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        self.as_ref().now()
    }
}

/// Real wall clock implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Clock for WallClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A hand-driven clock for deterministic tests.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a manual clock starting at the given instant.
    #[must_use]
    pub const fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Advance the clock by the given delta.
    pub fn advance(&self, delta: TimeDelta) {
        let mut current = self.current.lock().unwrap();
        *current += delta;
    }

    /// Set the clock to a specific instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.current.lock().unwrap() = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap()
    }
}
