//! Clock capability used for start/finish timestamps.
//!
//! The run takes a `&dyn Clock` instead of reading the system time directly,
//! so tests can pin the reported times.

use std::time::{Duration, SystemTime};

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> SystemTime;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(SystemTime);

impl FixedClock {
    /// Clock that always reports `at`.
    #[must_use]
    pub fn new(at: SystemTime) -> Self {
        Self(at)
    }

    /// Clock that always reports `secs` seconds after the Unix epoch.
    #[must_use]
    pub fn from_unix_secs(secs: u64) -> Self {
        Self(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}

/// Formats `time` as an RFC 7231 HTTP date, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
#[must_use]
pub fn format_timestamp(time: SystemTime) -> String {
    httpdate::fmt_http_date(time)
}
