// posetrack_driver/src/clock.rs

use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

/// A source of wall-clock time in seconds.
pub trait Clock {
    fn now_seconds(&self) -> f64;
}

/// Seconds since the Unix epoch, from the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_seconds(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default()
    }
}

/// A clock that only moves when told to. Used by the replay tool and tests.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn starting_at(seconds: f64) -> Self {
        Self {
            now: Cell::new(seconds),
        }
    }

    pub fn set(&self, seconds: f64) {
        self.now.set(seconds);
    }

    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now_seconds(&self) -> f64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_told() {
        let clock = ManualClock::starting_at(10.0);
        assert_eq!(clock.now_seconds(), 10.0);
        clock.advance(0.25);
        assert_eq!(clock.now_seconds(), 10.25);
        clock.set(3.0);
        assert_eq!(clock.now_seconds(), 3.0);
    }

    #[test]
    fn system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now_seconds();
        let b = clock.now_seconds();
        assert!(a > 0.0);
        assert!(b >= a);
    }
}
