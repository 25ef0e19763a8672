//! Environment abstraction for deterministic testing.
//!
//! The bridge needs wall-clock time for the ids and timestamps of messages it
//! synthesizes itself (join/leave notices, optimistic private messages).
//! Production reads the system clock; simulation supplies a virtual one.

use chrono::{DateTime, SecondsFormat, Utc};

/// Source of wall-clock time.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// Milliseconds since the Unix epoch, used as a synthesized message id.
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }

    /// RFC 3339 timestamp with millisecond precision.
    fn timestamp(&self) -> String {
        self.now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Environment backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a system environment.
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
