//! Monotonic time source for per-iteration measurements.

use std::time::Instant;

use tracing::warn;

/// Nanoseconds since the owning clock's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    /// Nanoseconds from `earlier` to `self`, clamped to zero if the clock regressed.
    pub fn nanos_since(self, earlier: Timestamp) -> u64 {
        match self.0.checked_sub(earlier.0) {
            Some(elapsed) => elapsed,
            None => {
                warn!(
                    start = earlier.0,
                    end = self.0,
                    "clock went backwards; clamping sample to zero"
                );
                0
            }
        }
    }
}

/// Source of monotonically non-decreasing timestamps.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// [`Clock`] backed by [`std::time::Instant`], immune to wall-clock changes.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline(always)]
    fn now(&self) -> Timestamp {
        let nanos = self.origin.elapsed().as_nanos();
        Timestamp(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
