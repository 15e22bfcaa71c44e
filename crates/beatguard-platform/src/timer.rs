//! Monotonic time sources.
//!
//! All BeatGuard timing is expressed as `u64` milliseconds (or microseconds)
//! since an arbitrary epoch. Consumers subtract with saturating arithmetic so a
//! clock that never goes backwards is the only requirement.

use portable_atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic clock with blocking delays.
pub trait Timer: Send + Sync {
    /// Milliseconds since the timer's epoch.
    fn millis(&self) -> u64;

    /// Microseconds since the timer's epoch.
    fn micros(&self) -> u64;

    /// Block the caller for `ms` milliseconds.
    fn delay_ms(&self, ms: u32);

    /// Block the caller for `us` microseconds.
    fn delay_us(&self, us: u32);
}

/// Wall-clock timer backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct StdTimer {
    epoch: Instant,
}

impl StdTimer {
    /// Create a timer whose epoch is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for StdTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for StdTimer {
    fn millis(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn micros(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_micros()).unwrap_or(u64::MAX)
    }

    fn delay_ms(&self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }

    fn delay_us(&self, us: u32) {
        std::thread::sleep(Duration::from_micros(u64::from(us)));
    }
}

/// Simulated clock that only moves when told to.
///
/// Delays advance the clock instead of sleeping, so code under test that waits
/// between retries runs instantly and deterministically.
#[derive(Debug, Default)]
pub struct ManualTimer {
    now_us: AtomicU64,
}

impl ManualTimer {
    /// Create a timer starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a timer starting at `ms`.
    #[must_use]
    pub fn starting_at_ms(ms: u64) -> Self {
        Self {
            now_us: AtomicU64::new(ms.saturating_mul(1000)),
        }
    }

    /// Move the clock forward by `ms` milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance_us(ms.saturating_mul(1000));
    }

    /// Move the clock forward by `us` microseconds.
    pub fn advance_us(&self, us: u64) {
        let mut current = self.now_us.load(Ordering::Acquire);
        loop {
            let next = current.saturating_add(us);
            match self.now_us.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }

    /// Jump to an absolute time. Earlier values are ignored to keep the clock
    /// monotonic.
    pub fn set_ms(&self, ms: u64) {
        self.now_us
            .fetch_max(ms.saturating_mul(1000), Ordering::AcqRel);
    }
}

impl Timer for ManualTimer {
    fn millis(&self) -> u64 {
        self.now_us.load(Ordering::Acquire) / 1000
    }

    fn micros(&self) -> u64 {
        self.now_us.load(Ordering::Acquire)
    }

    fn delay_ms(&self, ms: u32) {
        self.advance_ms(u64::from(ms));
    }

    fn delay_us(&self, us: u32) {
        self.advance_us(u64::from(us));
    }
}
