//! Fixed-rate tick scheduling.
//!
//! Wall-clock deltas accumulate and are released as whole simulation ticks so
//! game speed does not depend on the presentation rate. A long stall releases
//! at most `max_steps_per_advance` ticks and drops the remaining backlog.

use core::time::Duration;

use crate::constants::{FRAMES_PER_SECOND, MAX_STEPS_PER_ADVANCE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedStep {
    step: Duration,
    accumulator: Duration,
    max_steps_per_advance: u32,
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(FRAMES_PER_SECOND)
    }
}

impl FixedStep {
    pub fn new(ticks_per_second: u32) -> Self {
        let ticks_per_second = ticks_per_second.max(1);
        Self {
            step: Duration::from_secs(1) / ticks_per_second,
            accumulator: Duration::ZERO,
            max_steps_per_advance: MAX_STEPS_PER_ADVANCE,
        }
    }

    pub fn with_max_steps(mut self, max_steps_per_advance: u32) -> Self {
        self.max_steps_per_advance = max_steps_per_advance.max(1);
        self
    }

    #[inline]
    pub fn step(&self) -> Duration {
        self.step
    }

    #[inline]
    pub fn pending(&self) -> Duration {
        self.accumulator
    }

    /// Add `delta` and return how many ticks are due now.
    pub fn advance(&mut self, delta: Duration) -> u32 {
        self.accumulator += delta;

        let mut ticks = 0;
        while self.accumulator >= self.step && ticks < self.max_steps_per_advance {
            self.accumulator -= self.step;
            ticks += 1;
        }

        if self.accumulator >= self.step {
            self.accumulator = Duration::ZERO;
        }

        ticks
    }

    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn releases_one_tick_per_step() {
        let mut clock = FixedStep::new(60);
        let step = clock.step();
        assert_eq!(clock.advance(step), 1);
        assert_eq!(clock.advance(step / 2), 0);
        assert_eq!(clock.advance(step / 2), 1);
    }

    #[test]
    fn carries_remainder_between_calls() {
        let mut clock = FixedStep::new(100);
        assert_eq!(clock.advance(Duration::from_millis(25)), 2);
        assert_eq!(clock.pending(), Duration::from_millis(5));
        assert_eq!(clock.advance(Duration::from_millis(5)), 1);
        assert_eq!(clock.pending(), Duration::ZERO);
    }

    #[test]
    fn caps_catch_up_and_drops_backlog() {
        let mut clock = FixedStep::new(60).with_max_steps(5);
        assert_eq!(clock.advance(Duration::from_secs(2)), 5);
        assert_eq!(clock.pending(), Duration::ZERO);
        assert_eq!(clock.advance(Duration::ZERO), 0);
    }

    #[test]
    fn zero_rate_is_treated_as_one_hertz() {
        let clock = FixedStep::new(0);
        assert_eq!(clock.step(), Duration::from_secs(1));
    }
}
