//! Clock implementations.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

use crate::domain::Clock;

/// Reads the system wall-clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Returns a settable instant. Used where timestamps must be predictable.
#[derive(Debug)]
pub struct FixedClock {
    instant: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        let mut current = self.instant.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut current = self.instant.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *current += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
