//! Wall Clock
//!
//! The last-fully-charged timestamp is derived from the current time, so the
//! collector reads it through [`Clock`] and tests can pin it.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current time in fractional seconds since the Unix epoch
pub trait Clock: Send + Sync {
    fn now_unix_seconds(&self) -> f64;
}

/// The system wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_seconds(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default()
    }
}
