use std::time::Instant;

use hs_core::PerformanceCounter;

/// Monotonic nanosecond counter measured from construction.
pub struct InstantCounter {
    origin: Instant,
}

impl InstantCounter {
    pub const FREQUENCY: u64 = 1_000_000_000;

    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for InstantCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceCounter for InstantCounter {
    fn counter(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    fn frequency(&self) -> u64 {
        Self::FREQUENCY
    }
}
