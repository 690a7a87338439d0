//! Injectable time source
//!
//! The coordinator reads wall-clock time through this trait so tests can
//! pin "now" while tokio's virtual time drives the timers.

use chrono::{DateTime, Utc};

/// Source of the current instant
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
