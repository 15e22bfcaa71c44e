//! Watchdog backed by the platform peripheral.

use crate::device::{Countdown, Watchdog};
use crate::error::{WatchdogError, WatchdogResult};
use crate::state::{WatchdogKind, WatchdogState};
use beatguard_platform::{Platform, Timer, WatchdogPeripheral};

/// Hardware countdown.
///
/// The peripheral restarts the device on its own when starved. The remaining
/// time reported here is an estimate from the last feed, since peripherals
/// generally cannot be read back.
pub struct HardwareWatchdog<'a> {
    peripheral: &'a dyn WatchdogPeripheral,
    platform: &'a dyn Platform,
    timer: &'a dyn Timer,
    countdown: Countdown,
}

impl<'a> HardwareWatchdog<'a> {
    /// Wrap the platform's peripheral.
    ///
    /// # Errors
    ///
    /// Returns [`WatchdogError::HardwareUnavailable`] if the platform has no
    /// watchdog peripheral.
    pub fn new(platform: &'a dyn Platform, timer: &'a dyn Timer) -> WatchdogResult<Self> {
        let peripheral = platform
            .watchdog_peripheral()
            .ok_or(WatchdogError::HardwareUnavailable)?;
        Ok(Self {
            peripheral,
            platform,
            timer,
            countdown: Countdown::default(),
        })
    }
}

impl Watchdog for HardwareWatchdog<'_> {
    fn initialize(&mut self, timeout_ms: u32) -> WatchdogResult<()> {
        if timeout_ms == 0 {
            return Err(WatchdogError::InvalidTimeout(timeout_ms));
        }
        self.peripheral.configure(timeout_ms)?;
        self.countdown.arm(timeout_ms, self.timer.millis())?;
        tracing::info!(timeout_ms, "hardware watchdog armed");
        Ok(())
    }

    fn feed(&mut self) -> WatchdogResult<()> {
        self.countdown.feed(self.timer.millis())?;
        self.peripheral.feed();
        Ok(())
    }

    fn force_reset(&mut self) {
        tracing::error!(kind = "hardware", "watchdog forcing system reset");
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
        WatchdogKind::Hardware
    }
}

impl core::fmt::Debug for HardwareWatchdog<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HardwareWatchdog")
            .field("platform", &self.platform.platform_name())
            .field("countdown", &self.countdown)
            .finish_non_exhaustive()
    }
}
