//! Start-up selection of the watchdog device.

use crate::device::{Watchdog, WatchdogDevice};
use crate::error::WatchdogResult;
use crate::hardware::HardwareWatchdog;
use crate::software::SoftwareWatchdog;
use beatguard_platform::{Platform, Timer};

/// Builds an armed [`WatchdogDevice`].
#[derive(Debug, Clone, Copy)]
pub struct WatchdogFactory;

impl WatchdogFactory {
    /// Prefer hardware; fall back to software if the peripheral is missing
    /// or rejects the timeout.
    ///
    /// # Errors
    ///
    /// Returns an error only if the software fallback also fails, which
    /// happens for a zero timeout.
    pub fn create<'a>(
        platform: &'a dyn Platform,
        timer: &'a dyn Timer,
        timeout_ms: u32,
    ) -> WatchdogResult<WatchdogDevice<'a>> {
        match Self::create_hardware(platform, timer, timeout_ms) {
            Ok(device) => Ok(device),
            Err(error) => {
                tracing::warn!(%error, timeout_ms, "hardware watchdog unavailable, using software fallback");
                Self::create_software(platform, timer, timeout_ms)
            }
        }
    }

    /// Arm the hardware device.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no peripheral or it rejects the
    /// timeout.
    pub fn create_hardware<'a>(
        platform: &'a dyn Platform,
        timer: &'a dyn Timer,
        timeout_ms: u32,
    ) -> WatchdogResult<WatchdogDevice<'a>> {
        let mut hw = HardwareWatchdog::new(platform, timer)?;
        hw.initialize(timeout_ms)?;
        Ok(WatchdogDevice::Hardware(hw))
    }

    /// Arm the software device.
    ///
    /// # Errors
    ///
    /// Returns an error if `timeout_ms` is zero.
    pub fn create_software<'a>(
        platform: &'a dyn Platform,
        timer: &'a dyn Timer,
        timeout_ms: u32,
    ) -> WatchdogResult<WatchdogDevice<'a>> {
        let mut sw = SoftwareWatchdog::new(platform, timer);
        sw.initialize(timeout_ms)?;
        Ok(WatchdogDevice::Software(sw))
    }
}
