pub mod clock {
    use chrono::{DateTime, Utc};
    use std::cell::Cell;
    use std::time::Instant;

    /// Millisecond time source for the control loop.
    pub trait Clock {
        /// Monotonic milliseconds since the clock was created.
        fn now_ms(&self) -> u64;

        /// Wall-clock time, only used to stamp telemetry.
        fn wall_time(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Real clock backed by `Instant`.
    #[derive(Debug, Clone, Copy)]
    pub struct MonotonicClock {
        start: Instant,
    }

    impl MonotonicClock {
        pub fn new() -> MonotonicClock {
            MonotonicClock {
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
        fn now_ms(&self) -> u64 {
            u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
        }
    }

    /// Clock that only moves when told to. Wall time is the Unix epoch plus
    /// the current reading.
    #[derive(Debug, Default)]
    pub struct ManualClock {
        now: Cell<u64>,
    }

    impl ManualClock {
        pub fn new(start_ms: u64) -> ManualClock {
            ManualClock {
                now: Cell::new(start_ms),
            }
        }

        pub fn set(&self, ms: u64) {
            self.now.set(ms);
        }

        pub fn advance(&self, ms: u64) {
            self.now.set(self.now.get().saturating_add(ms));
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> u64 {
            self.now.get()
        }

        fn wall_time(&self) -> DateTime<Utc> {
            let ms = i64::try_from(self.now.get()).unwrap_or(i64::MAX);
            DateTime::from_timestamp_millis(ms).unwrap_or_default()
        }
    }

    impl<C: Clock + ?Sized> Clock for &C {
        fn now_ms(&self) -> u64 {
            (**self).now_ms()
        }

        fn wall_time(&self) -> DateTime<Utc> {
            (**self).wall_time()
        }
    }

}

pub use clock::{Clock, ManualClock, MonotonicClock};
