//! Wall-clock access for the timing engine.
//!
//! The engine never reads ambient time. Every time-dependent operation takes
//! a timestamp obtained from a [`Clock`], which keeps totals, threshold
//! checks, and exports deterministic under test.

use std::cell::Cell;
use std::time::Duration;

use chrono::{Local, NaiveTime};

/// Nominal period of the refresh tick that keeps running totals live.
///
/// The engine itself does no scheduling; the caller delivers ticks at
/// roughly this rate and recomputes whatever it displays.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Source of the current time of day.
pub trait Clock {
    /// Returns the current time of day.
    fn now(&self) -> NaiveTime;
}

/// Clock backed by the system's local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Manually-driven clock for deterministic tests.
///
/// Starts at a fixed time and only moves when told to. Interior mutability
/// lets a single instance be shared by the code under test and the test
/// driver without threading `&mut` through every call.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<NaiveTime>,
}

impl ManualClock {
    /// Creates a clock fixed at the given time.
    #[must_use]
    pub const fn new(now: NaiveTime) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Moves the clock to a new time.
    pub fn set(&self, now: NaiveTime) {
        self.now.set(now);
    }

    /// Advances the clock by whole seconds, wrapping at midnight.
    pub fn advance_secs(&self, secs: i64) {
        self.now.set(self.now.get() + chrono::Duration::seconds(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveTime {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn manual_clock_holds_its_time() {
        let clock = ManualClock::new(t(9, 30, 0));
        assert_eq!(clock.now(), t(9, 30, 0));
        assert_eq!(clock.now(), t(9, 30, 0));
    }

    #[test]
    fn manual_clock_set_and_advance() {
        let clock = ManualClock::new(t(9, 30, 0));
        clock.advance_secs(65);
        assert_eq!(clock.now(), t(9, 31, 5));

        clock.set(t(14, 0, 0));
        assert_eq!(clock.now(), t(14, 0, 0));
    }

    #[test]
    fn manual_clock_wraps_at_midnight() {
        let clock = ManualClock::new(t(23, 59, 59));
        clock.advance_secs(2);
        assert_eq!(clock.now(), t(0, 0, 1));
    }

    #[test]
    fn tick_interval_is_one_second() {
        assert_eq!(TICK_INTERVAL, Duration::from_secs(1));
    }
}
