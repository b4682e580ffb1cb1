use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::error::{TvcError, TvcResult};

// ---------------------------------------------------------------------------
// Elapsed-time sources
// ---------------------------------------------------------------------------

/// Source of elapsed run time shared by the mount and the loop driver.
///
/// Implementations must be monotonic for the duration of a run.
pub trait TimeSource: Send + Sync {
    /// Elapsed time since the run started.
    fn time(&self) -> Duration;
}

/// Wall-clock time source. Reads zero until [`TimeClock::start`] is called.
#[derive(Debug, Default)]
pub struct TimeClock {
    origin: RwLock<Option<Instant>>,
}

impl TimeClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the reference instant. A clock can only be started once.
    pub fn start(&self) -> TvcResult<()> {
        let mut origin = self.origin.write();
        if origin.is_some() {
            return Err(TvcError::ClockAlreadyStarted);
        }
        *origin = Some(Instant::now());
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.origin.read().is_some()
    }
}

impl TimeSource for TimeClock {
    fn time(&self) -> Duration {
        match *self.origin.read() {
            Some(origin) => origin.elapsed(),
            None => Duration::ZERO,
        }
    }
}

/// Deterministic time source advanced explicitly by the caller.
///
/// Used to run the control loop reproducibly, independent of wall-clock jitter.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: RwLock<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward by `dt`.
    pub fn advance(&self, dt: Duration) {
        *self.now.write() += dt;
    }
}

impl TimeSource for ManualClock {
    fn time(&self) -> Duration {
        *self.now.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unstarted_clock_reads_zero() {
        let clock = TimeClock::new();
        assert!(!clock.is_started());
        assert_eq!(clock.time(), Duration::ZERO);
    }

    #[test]
    fn started_clock_is_monotonic() {
        let clock = TimeClock::new();
        clock.start().unwrap();
        let a = clock.time();
        std::thread::sleep(Duration::from_millis(2));
        let b = clock.time();
        assert!(b > a, "elapsed time should grow: {:?} -> {:?}", a, b);
    }

    #[test]
    fn second_start_is_rejected() {
        let clock = TimeClock::new();
        clock.start().unwrap();
        assert_eq!(clock.start(), Err(TvcError::ClockAlreadyStarted));
    }

    #[test]
    fn manual_clock_advances_exactly() {
        let clock = ManualClock::new();
        clock.advance(Duration::from_millis(50));
        clock.advance(Duration::from_millis(50));
        assert_eq!(clock.time(), Duration::from_millis(100));
    }
}
