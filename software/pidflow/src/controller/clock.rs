//! Time sources for the controller.
//!
//! The controller never reads the system clock directly. It asks a `Clock`
//! for the current time in seconds, so that a loop can be driven in real time
//! or stepped deterministically in tests and simulation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// A monotonically non-decreasing time reading in seconds.
pub trait Clock {
    /// Current time in seconds
    fn now_s(&self) -> f64;
}

/// Wall-clock time in seconds since this clock was created.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_s(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same reading, so a test can keep one handle
/// and give another to the controller.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    // f64 bits
    t: Arc<AtomicU64>,
}

impl ManualClock {
    /// Start a clock at `t_s` seconds
    pub fn starting_at(t_s: f64) -> Self {
        let clock = Self::default();
        clock.set(t_s);
        clock
    }

    /// Jump to an absolute time.
    ///
    /// Moving backwards is not prevented; the controller will see a negative
    /// time step on its next update.
    pub fn set(&self, t_s: f64) {
        self.t.store(t_s.to_bits(), Ordering::Release);
    }

    /// Step forward by `dt_s` seconds
    pub fn advance(&self, dt_s: f64) {
        self.set(self.now_s() + dt_s);
    }
}

impl Clock for ManualClock {
    fn now_s(&self) -> f64 {
        f64::from_bits(self.t.load(Ordering::Acquire))
    }
}
