//! Wall-clock seam.
//!
//! Rate limiting is enforced by timestamp comparison at transition
//! time — no timer threads. The session reads its clock once per
//! inbound message and hands the timestamp down; deterministic drivers
//! bypass the clock entirely by supplying timestamps themselves.

use crate::types::UnixTime;

pub trait Clock: Send {
    /// Seconds since the Unix epoch.
    fn now(&self) -> UnixTime;
}

/// The real wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> UnixTime {
        chrono::Utc::now().timestamp_millis() as f64 / 1000.0
    }
}
