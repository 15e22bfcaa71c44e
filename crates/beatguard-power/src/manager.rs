//! Activity-driven power-mode selection.

use crate::config::PowerConfig;
use crate::error::PowerResult;
use crate::mode::{ActivityLevel, PowerMode, snap_cpu_frequency_mhz};
use beatguard_platform::{PowerControl, Timer};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Snapshot of power accounting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerStats {
    /// Active mode.
    pub current_mode: PowerMode,
    /// Most recently reported activity.
    pub current_activity: ActivityLevel,
    /// Milliseconds since the manager was created.
    pub uptime_ms: u64,
    /// Accumulated time spent idle past the idle timeout.
    pub idle_time_ms: u64,
    /// Accumulated light-sleep time.
    pub sleep_time_ms: u64,
    /// Estimated average draw. Not measured on this hardware, always zero.
    pub average_power_ma: f32,
    /// Whether the radio is in power-save.
    pub radio_power_save: bool,
    /// Applied CPU clock.
    pub cpu_frequency_mhz: u32,
}

/// Chooses and applies power modes from reported activity and idle time.
///
/// The manager is ready to use once constructed: the configured default mode
/// has already been applied and the activity level starts at
/// [`ActivityLevel::Moderate`].
///
/// Modes only move through [`update_activity`](Self::update_activity),
/// [`set_power_mode`](Self::set_power_mode) and the idle rule in
/// [`execute_power_management`](Self::execute_power_management), so repeated
/// reports of the same activity never change anything.
pub struct PowerManager<'a> {
    timer: &'a dyn Timer,
    control: &'a dyn PowerControl,
    config: PowerConfig,
    current_mode: PowerMode,
    current_activity: ActivityLevel,
    uptime_start_ms: u64,
    last_activity_ms: u64,
    idle_accounted_until_ms: u64,
    idle_time_ms: u64,
    sleep_time_ms: u64,
}

impl<'a> PowerManager<'a> {
    /// Create a manager and apply the default mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(
        timer: &'a dyn Timer,
        control: &'a dyn PowerControl,
        config: PowerConfig,
    ) -> PowerResult<Self> {
        config.validate()?;
        let now = timer.millis();
        let manager = Self {
            timer,
            control,
            config,
            current_mode: config.default_mode,
            current_activity: ActivityLevel::Moderate,
            uptime_start_ms: now,
            last_activity_ms: now,
            idle_accounted_until_ms: now,
            idle_time_ms: 0,
            sleep_time_ms: 0,
        };
        manager.apply_power_mode(manager.current_mode);
        info!(mode = %manager.current_mode, "Power manager initialized");
        Ok(manager)
    }

    /// Configuration in effect.
    #[must_use]
    pub fn config(&self) -> &PowerConfig {
        &self.config
    }

    /// Record a new activity level and, with dynamic frequency enabled,
    /// switch to the mode the level prescribes.
    pub fn update_activity(&mut self, level: ActivityLevel) {
        let now = self.timer.millis();
        self.current_activity = level;
        self.last_activity_ms = now;
        self.idle_accounted_until_ms = now;

        if self.config.enable_dynamic_frequency {
            let target = PowerMode::for_activity(level);
            if target != self.current_mode {
                self.set_power_mode(target);
            }
        }
    }

    /// Periodic tick: account idle time, force power-save once idle past the
    /// timeout, then re-apply the current mode.
    ///
    /// The idle rule only ever lowers power: an explicitly selected
    /// [`PowerMode::UltraLowPower`] stays as it is instead of being forced to
    /// [`PowerMode::PowerSave`] like every other mode.
    pub fn execute_power_management(&mut self) {
        let now = self.timer.millis();

        if self.idle_duration_ms(now) > self.config.idle_timeout_ms {
            let since = self.idle_accounted_until_ms.max(self.last_activity_ms);
            self.idle_time_ms = self
                .idle_time_ms
                .saturating_add(now.saturating_sub(since));
            self.idle_accounted_until_ms = now;

            if !matches!(
                self.current_mode,
                PowerMode::PowerSave | PowerMode::UltraLowPower
            ) {
                debug!(idle_ms = self.idle_duration_ms(now), "Idle timeout reached");
                self.current_mode = PowerMode::PowerSave;
                info!(mode = %self.current_mode, "Power mode changed");
            }
        }

        self.apply_power_mode(self.current_mode);
    }

    /// Select and apply a mode.
    pub fn set_power_mode(&mut self, mode: PowerMode) {
        if mode != self.current_mode {
            info!(from = %self.current_mode, to = %mode, "Power mode changed");
        }
        self.current_mode = mode;
        self.apply_power_mode(mode);
    }

    /// Active mode.
    #[must_use]
    pub fn current_power_mode(&self) -> PowerMode {
        self.current_mode
    }

    /// Most recently reported activity.
    #[must_use]
    pub fn current_activity(&self) -> ActivityLevel {
        self.current_activity
    }

    /// Enter light sleep for `duration_ms` and account the time.
    pub fn force_sleep(&mut self, duration_ms: u32) {
        debug!(duration_ms, "Entering light sleep");
        self.control.light_sleep(duration_ms);
        self.sleep_time_ms = self.sleep_time_ms.saturating_add(u64::from(duration_ms));
    }

    /// Treat now as the latest activity.
    pub fn wake_up(&mut self) {
        let now = self.timer.millis();
        self.last_activity_ms = now;
        self.idle_accounted_until_ms = now;
    }

    /// Whether the device has been idle past the idle timeout.
    #[must_use]
    pub fn should_enter_low_power_mode(&self) -> bool {
        self.idle_duration_ms(self.timer.millis()) > self.config.idle_timeout_ms
    }

    /// Whether the device has been idle past the sleep timeout. Advisory
    /// only; the caller decides whether to call [`force_sleep`](Self::force_sleep).
    #[must_use]
    pub fn should_enter_sleep(&self) -> bool {
        self.idle_duration_ms(self.timer.millis()) > self.config.sleep_timeout_ms
    }

    /// Current accounting snapshot.
    #[must_use]
    pub fn power_stats(&self) -> PowerStats {
        let now = self.timer.millis();
        PowerStats {
            current_mode: self.current_mode,
            current_activity: self.current_activity,
            uptime_ms: now.saturating_sub(self.uptime_start_ms),
            idle_time_ms: self.idle_time_ms,
            sleep_time_ms: self.sleep_time_ms,
            average_power_ma: 0.0,
            radio_power_save: self.config.enable_radio_power_management
                && self.current_mode.radio_power_save(),
            cpu_frequency_mhz: snap_cpu_frequency_mhz(self.current_mode.cpu_frequency_mhz()),
        }
    }

    fn idle_duration_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_activity_ms)
    }

    fn apply_power_mode(&self, mode: PowerMode) {
        let mhz = snap_cpu_frequency_mhz(mode.cpu_frequency_mhz());
        if let Err(e) = self.control.set_cpu_frequency_mhz(mhz) {
            warn!(error = %e, mhz, "Failed to set CPU frequency");
        }
        if self.config.enable_peripheral_powerdown {
            self.control
                .set_peripheral_power_down(mode.peripheral_power_down());
        }
        if self.config.enable_radio_power_management {
            self.control.set_radio_power_save(mode.radio_power_save());
        }
    }
}

impl core::fmt::Debug for PowerManager<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PowerManager")
            .field("config", &self.config)
            .field("current_mode", &self.current_mode)
            .field("current_activity", &self.current_activity)
            .field("idle_time_ms", &self.idle_time_ms)
            .field("sleep_time_ms", &self.sleep_time_ms)
            .finish_non_exhaustive()
    }
}
