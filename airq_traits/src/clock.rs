use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Wall-clock abstraction used to stamp readings and pace polling.
///
/// - epoch_ms(): milliseconds since the Unix epoch
/// - sleep(): sleeps for the provided duration (implementations may simulate)
/// - ms_since(): helper to compute elapsed milliseconds from an earlier stamp
pub trait Clock {
    fn epoch_ms(&self) -> u64;
    fn sleep(&self, d: Duration);

    /// Milliseconds elapsed since `earlier_ms`, saturating at 0 on underflow.
    fn ms_since(&self, earlier_ms: u64) -> u64 {
        self.epoch_ms().saturating_sub(earlier_ms)
    }
}

/// Default, real wall clock backed by std::time::SystemTime.
#[derive(Debug, Default, Clone, Copy)]
pub struct WallClock;

impl WallClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for WallClock {
    #[inline]
    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

#[cfg(test)]
pub mod test_clock {
    use super::*;

    /// Deterministic test clock whose time can be advanced manually.
    ///
    /// epoch_ms() = origin + offset
    /// sleep(d) advances internal time by d without actually sleeping.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        origin_ms: u64,
        offset: std::sync::Arc<std::sync::Mutex<Duration>>,
    }

    impl ManualClock {
        pub fn new(origin_ms: u64) -> Self {
            Self {
                origin_ms,
                offset: std::sync::Arc::new(std::sync::Mutex::new(Duration::ZERO)),
            }
        }

        /// Advance the clock by the given duration.
        pub fn advance(&self, d: Duration) {
            if let Ok(mut off) = self.offset.lock() {
                *off = off.saturating_add(d);
            }
        }
    }

    impl Clock for ManualClock {
        fn epoch_ms(&self) -> u64 {
            let off = self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO);
            self.origin_ms + off.as_millis() as u64
        }

        fn sleep(&self, d: Duration) {
            self.advance(d);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_clock::ManualClock;
    use super::*;

    #[test]
    fn wall_clock_is_nondecreasing() {
        let clock = WallClock::new();
        let a = clock.epoch_ms();
        let b = clock.epoch_ms();
        assert!(a > 0);
        assert!(b >= a);
    }

    #[test]
    fn manual_clock_advances_on_sleep() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.epoch_ms(), 1_000);
        clock.sleep(Duration::from_millis(250));
        assert_eq!(clock.epoch_ms(), 1_250);
    }

    #[test]
    fn ms_since_saturates() {
        let clock = ManualClock::new(500);
        assert_eq!(clock.ms_since(2_000), 0);
        assert_eq!(clock.ms_since(100), 400);
    }
}
