//! The watchdog device interface and the tagged device value.

use crate::error::{WatchdogError, WatchdogResult};
use crate::hardware::HardwareWatchdog;
use crate::software::SoftwareWatchdog;
use crate::state::{WatchdogKind, WatchdogState};

/// A countdown that restarts the device unless fed.
pub trait Watchdog {
    /// Arm the countdown with `timeout_ms`.
    ///
    /// # Errors
    ///
    /// Returns an error if `timeout_ms` is zero or the device rejects it.
    fn initialize(&mut self, timeout_ms: u32) -> WatchdogResult<()>;

    /// Reload the countdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is not armed or has already reset.
    fn feed(&mut self) -> WatchdogResult<()>;

    /// Restart the device through the platform.
    fn force_reset(&mut self);

    /// Milliseconds until the countdown expires; 0 once starved or unarmed.
    fn time_remaining_ms(&self) -> u32;

    /// Current lifecycle state.
    fn state(&self) -> WatchdogState;

    /// Configured timeout, 0 when unarmed.
    fn timeout_ms(&self) -> u32;

    /// Which device kind this is.
    fn kind(&self) -> WatchdogKind;

    /// Whether the countdown is armed.
    fn is_active(&self) -> bool {
        self.state().is_active()
    }
}

/// Countdown bookkeeping shared by both device kinds.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Countdown {
    timeout_ms: u32,
    last_feed_ms: u64,
    armed: bool,
    reset: bool,
}

impl Countdown {
    pub(crate) fn arm(&mut self, timeout_ms: u32, now_ms: u64) -> WatchdogResult<()> {
        if timeout_ms == 0 {
            return Err(WatchdogError::InvalidTimeout(timeout_ms));
        }
        *self = Self {
            timeout_ms,
            last_feed_ms: now_ms,
            armed: true,
            reset: false,
        };
        Ok(())
    }

    pub(crate) fn feed(&mut self, now_ms: u64) -> WatchdogResult<()> {
        if self.reset {
            return Err(WatchdogError::AlreadyReset);
        }
        if !self.armed {
            return Err(WatchdogError::NotInitialized);
        }
        self.last_feed_ms = now_ms;
        Ok(())
    }

    pub(crate) fn mark_reset(&mut self) {
        self.reset = true;
    }

    pub(crate) fn remaining_ms(&self, now_ms: u64) -> u32 {
        if !self.armed || self.reset {
            return 0;
        }
        let elapsed = now_ms.saturating_sub(self.last_feed_ms);
        let remaining = u64::from(self.timeout_ms).saturating_sub(elapsed);
        u32::try_from(remaining).unwrap_or(u32::MAX)
    }

    pub(crate) fn state(&self, now_ms: u64) -> WatchdogState {
        if self.reset {
            WatchdogState::Reset
        } else if !self.armed {
            WatchdogState::Uninitialized
        } else if self.remaining_ms(now_ms) == 0 {
            WatchdogState::Starved
        } else {
            WatchdogState::Active
        }
    }

    pub(crate) fn timeout_ms(&self) -> u32 {
        if self.armed { self.timeout_ms } else { 0 }
    }
}

/// The device chosen at start-up.
///
/// Dispatch is a `match`, so callers never branch on platform features.
#[derive(Debug)]
pub enum WatchdogDevice<'a> {
    /// Backed by the platform peripheral.
    Hardware(HardwareWatchdog<'a>),
    /// Polled software fallback.
    Software(SoftwareWatchdog<'a>),
}

impl WatchdogDevice<'_> {
    /// Give a software device its chance to detect starvation.
    ///
    /// Hardware devices reset on their own; this is a no-op for them and
    /// returns `false`. Returns `true` if a reset was forced.
    pub fn poll(&mut self) -> bool {
        match self {
            Self::Hardware(_) => false,
            Self::Software(sw) => sw.poll(),
        }
    }
}

impl Watchdog for WatchdogDevice<'_> {
    fn initialize(&mut self, timeout_ms: u32) -> WatchdogResult<()> {
        match self {
            Self::Hardware(hw) => hw.initialize(timeout_ms),
            Self::Software(sw) => sw.initialize(timeout_ms),
        }
    }

    fn feed(&mut self) -> WatchdogResult<()> {
        match self {
            Self::Hardware(hw) => hw.feed(),
            Self::Software(sw) => sw.feed(),
        }
    }

    fn force_reset(&mut self) {
        match self {
            Self::Hardware(hw) => hw.force_reset(),
            Self::Software(sw) => sw.force_reset(),
        }
    }

    fn time_remaining_ms(&self) -> u32 {
        match self {
            Self::Hardware(hw) => hw.time_remaining_ms(),
            Self::Software(sw) => sw.time_remaining_ms(),
        }
    }

    fn state(&self) -> WatchdogState {
        match self {
            Self::Hardware(hw) => hw.state(),
            Self::Software(sw) => sw.state(),
        }
    }

    fn timeout_ms(&self) -> u32 {
        match self {
            Self::Hardware(hw) => hw.timeout_ms(),
            Self::Software(sw) => sw.timeout_ms(),
        }
    }

    fn kind(&self) -> WatchdogKind {
        match self {
            Self::Hardware(_) => WatchdogKind::Hardware,
            Self::Software(_) => WatchdogKind::Software,
        }
    }
}
