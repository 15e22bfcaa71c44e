//! Polled software watchdog.

use crate::device::{Countdown, Watchdog};
use crate::error::WatchdogResult;
use crate::state::{WatchdogKind, WatchdogState};
use beatguard_platform::{Platform, Timer};

/// Software fallback comparing `timer.millis() - last_feed` with the timeout.
///
/// # Weaker guarantee
///
/// This device cannot pre-empt execution. A task that hangs will only be
/// caught the next time someone calls [`SoftwareWatchdog::poll`], and a hang in
/// the polling task itself is never caught. Prefer the hardware device whenever
/// the platform has one.
pub struct SoftwareWatchdog<'a> {
    platform: &'a dyn Platform,
    timer: &'a dyn Timer,
    countdown: Countdown,
}

impl<'a> SoftwareWatchdog<'a> {
    /// Create an unarmed software watchdog.
    #[must_use]
    pub fn new(platform: &'a dyn Platform, timer: &'a dyn Timer) -> Self {
        Self {
            platform,
            timer,
            countdown: Countdown::default(),
        }
    }

    /// Check for starvation, forcing a reset if the countdown expired.
    ///
    /// Returns `true` if a reset was forced by this call.
    pub fn poll(&mut self) -> bool {
        if self.state() == WatchdogState::Starved {
            tracing::error!(
                timeout_ms = self.countdown.timeout_ms(),
                "software watchdog starved"
            );
            self.force_reset();
            return true;
        }
        false
    }
}

impl Watchdog for SoftwareWatchdog<'_> {
    fn initialize(&mut self, timeout_ms: u32) -> WatchdogResult<()> {
        self.countdown.arm(timeout_ms, self.timer.millis())?;
        tracing::info!(timeout_ms, "software watchdog armed");
        Ok(())
    }

    fn feed(&mut self) -> WatchdogResult<()> {
        self.countdown.feed(self.timer.millis())
    }

    fn force_reset(&mut self) {
        tracing::error!(kind = "software", "watchdog forcing system reset");
        self.countdown.mark_reset();
        self.platform.restart();
    }

    fn time_remaining_ms(&self) -> u32 {
        self.countdown.remaining_ms(self.timer.millis())
    }

    fn state(&self) -> WatchdogState {
        self.countdown.state(self.timer.millis())
    }

    fn timeout_ms(&self) -> u32 {
        self.countdown.timeout_ms()
    }

    fn kind(&self) -> WatchdogKind {
        WatchdogKind::Software
    }
}

impl core::fmt::Debug for SoftwareWatchdog<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SoftwareWatchdog")
            .field("platform", &self.platform.platform_name())
            .field("countdown", &self.countdown)
            .finish_non_exhaustive()
    }
}
