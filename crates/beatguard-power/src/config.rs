//! Power manager configuration.

use crate::error::{PowerError, PowerResult};
use crate::mode::PowerMode;
use serde::{Deserialize, Serialize};

/// Power manager configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    /// Mode applied at start-up.
    ///
    /// Default: balanced.
    pub default_mode: PowerMode,

    /// Inactivity after which the steady tick forces power-save.
    ///
    /// Default: 30 s.
    pub idle_timeout_ms: u64,

    /// Inactivity after which light sleep is advised.
    ///
    /// Default: 5 min.
    pub sleep_timeout_ms: u64,

    /// Follow activity updates with mode changes.
    pub enable_dynamic_frequency: bool,

    /// Let modes power idle peripherals down.
    pub enable_peripheral_powerdown: bool,

    /// Let modes put the radio into power-save.
    pub enable_radio_power_management: bool,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            default_mode: PowerMode::Balanced,
            idle_timeout_ms: 30_000,
            sleep_timeout_ms: 300_000,
            enable_dynamic_frequency: true,
            enable_peripheral_powerdown: true,
            enable_radio_power_management: true,
        }
    }
}

impl PowerConfig {
    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> PowerConfigBuilder {
        PowerConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a timeout is zero or the sleep timeout is shorter
    /// than the idle timeout.
    pub fn validate(&self) -> PowerResult<()> {
        if self.idle_timeout_ms == 0 {
            return Err(PowerError::invalid_configuration(
                "idle_timeout_ms must be non-zero",
            ));
        }
        if self.sleep_timeout_ms < self.idle_timeout_ms {
            return Err(PowerError::invalid_configuration(
                "sleep_timeout_ms must not be shorter than idle_timeout_ms",
            ));
        }
        Ok(())
    }
}

/// Builder for [`PowerConfig`].
#[derive(Debug, Default)]
pub struct PowerConfigBuilder {
    config: PowerConfig,
}

impl PowerConfigBuilder {
    /// Set the start-up mode.
    #[must_use]
    pub fn default_mode(mut self, mode: PowerMode) -> Self {
        self.config.default_mode = mode;
        self
    }

    /// Set the idle timeout.
    #[must_use]
    pub fn idle_timeout_ms(mut self, ms: u64) -> Self {
        self.config.idle_timeout_ms = ms;
        self
    }

    /// Set the sleep timeout.
    #[must_use]
    pub fn sleep_timeout_ms(mut self, ms: u64) -> Self {
        self.config.sleep_timeout_ms = ms;
        self
    }

    /// Enable or disable activity-driven mode changes.
    #[must_use]
    pub fn dynamic_frequency(mut self, enabled: bool) -> Self {
        self.config.enable_dynamic_frequency = enabled;
        self
    }

    /// Enable or disable peripheral power-down.
    #[must_use]
    pub fn peripheral_powerdown(mut self, enabled: bool) -> Self {
        self.config.enable_peripheral_powerdown = enabled;
        self
    }

    /// Enable or disable radio power management.
    #[must_use]
    pub fn radio_power_management(mut self, enabled: bool) -> Self {
        self.config.enable_radio_power_management = enabled;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> PowerResult<PowerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
