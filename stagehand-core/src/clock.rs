//! Frame clock supplying per-tick elapsed time.

use std::time::Instant;

/// Source of the elapsed time fed into each `tick` call.
pub trait FrameClock {
    /// Seconds elapsed since the previous call (or since creation on the first call).
    fn elapsed_seconds_since_last_tick(&mut self) -> f64;
}

/// Wall-clock frame clock backed by [`Instant`].
pub struct SystemFrameClock {
    last: Instant,
}

impl SystemFrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }
}

impl Default for SystemFrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemFrameClock {
    fn elapsed_seconds_since_last_tick(&mut self) -> f64 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last).as_secs_f64();
        self.last = now;
        elapsed
    }
}
