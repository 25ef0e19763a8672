//! Virtual clock.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use murmur_client::Environment;

/// Environment with a clock that only moves when told to.
///
/// Clones share the same clock, so a test can keep a handle after moving
/// the environment into a runtime.
#[derive(Debug, Clone)]
pub struct SimEnv {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl SimEnv {
    /// Create an environment starting at 2024-01-01T00:00:00Z.
    pub fn new() -> Self {
        Self::at(Utc.timestamp_opt(1_704_067_200, 0).single().unwrap_or_default())
    }

    /// Create an environment starting at `start`.
    pub fn at(start: DateTime<Utc>) -> Self {
        Self { now: Arc::new(Mutex::new(start)) }
    }

    /// Move the clock forward.
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

impl Environment for SimEnv {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
