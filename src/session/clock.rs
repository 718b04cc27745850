//! Wall-clock source for session timing.

use chrono::{DateTime, Duration, Local};
use parking_lot::Mutex;

/// Source of wall-clock time for recorders.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// The system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Local>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock by `ms` milliseconds. Negative values step it back.
    pub fn advance_ms(&self, ms: i64) {
        let mut now = self.now.lock();
        *now += Duration::milliseconds(ms);
    }

    pub fn set(&self, to: DateTime<Local>) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_moves_both_ways() {
        let start = Local::now();
        let clock = ManualClock::new(start);
        clock.advance_ms(1500);
        assert_eq!((clock.now() - start).num_milliseconds(), 1500);
        clock.advance_ms(-2000);
        assert_eq!((clock.now() - start).num_milliseconds(), -500);

        clock.set(start);
        assert_eq!(clock.now(), start);
    }
}
