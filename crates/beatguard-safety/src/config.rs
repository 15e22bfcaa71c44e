//! Safety manager and start-up configuration.

use crate::error::{ConfigError, ConfigResult, SafetyError, SafetyResult};
use beatguard_power::PowerConfig;
use beatguard_tasks::TaskPresets;
use beatguard_watchdog::MAX_CONSECUTIVE_FAILURES;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Safety manager configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Watchdog countdown.
    ///
    /// Default: 30 s.
    pub watchdog_timeout_ms: u32,

    /// Cadence of the full health check.
    ///
    /// Default: 5 s.
    pub health_check_interval_ms: u64,

    /// Cadence of the heap usage and fragmentation check.
    ///
    /// Default: 10 s.
    pub memory_check_interval_ms: u64,

    /// Failed watchdog health checks in a row before fail-safe.
    ///
    /// Default: 3.
    pub max_consecutive_failures: u32,

    /// Latch fail-safe mode on CRITICAL and FATAL reports.
    pub enable_fail_safe_mode: bool,

    /// Include heap checks.
    pub enable_memory_monitoring: bool,

    /// Include the stack headroom check.
    pub enable_stack_monitoring: bool,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            watchdog_timeout_ms: 30_000,
            health_check_interval_ms: 5_000,
            memory_check_interval_ms: 10_000,
            max_consecutive_failures: MAX_CONSECUTIVE_FAILURES,
            enable_fail_safe_mode: true,
            enable_memory_monitoring: true,
            enable_stack_monitoring: true,
        }
    }
}

impl SafetyConfig {
    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> SafetyConfigBuilder {
        SafetyConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a timeout or interval is zero, or if the health
    /// check would run less often than the watchdog expires.
    pub fn validate(&self) -> SafetyResult<()> {
        if self.watchdog_timeout_ms == 0 {
            return Err(SafetyError::invalid_configuration(
                "watchdog_timeout_ms must be non-zero",
            ));
        }
        if self.health_check_interval_ms == 0 || self.memory_check_interval_ms == 0 {
            return Err(SafetyError::invalid_configuration(
                "check intervals must be non-zero",
            ));
        }
        if self.health_check_interval_ms >= u64::from(self.watchdog_timeout_ms) {
            return Err(SafetyError::invalid_configuration(format!(
                "health_check_interval_ms ({}) must be shorter than watchdog_timeout_ms ({})",
                self.health_check_interval_ms, self.watchdog_timeout_ms
            )));
        }
        if self.max_consecutive_failures == 0 {
            return Err(SafetyError::invalid_configuration(
                "max_consecutive_failures must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Builder for [`SafetyConfig`].
#[derive(Debug, Default)]
pub struct SafetyConfigBuilder {
    config: SafetyConfig,
}

impl SafetyConfigBuilder {
    /// Set the watchdog timeout.
    #[must_use]
    pub fn watchdog_timeout_ms(mut self, ms: u32) -> Self {
        self.config.watchdog_timeout_ms = ms;
        self
    }

    /// Set the health check cadence.
    #[must_use]
    pub fn health_check_interval_ms(mut self, ms: u64) -> Self {
        self.config.health_check_interval_ms = ms;
        self
    }

    /// Set the memory check cadence.
    #[must_use]
    pub fn memory_check_interval_ms(mut self, ms: u64) -> Self {
        self.config.memory_check_interval_ms = ms;
        self
    }

    /// Set the watchdog escalation threshold.
    #[must_use]
    pub fn max_consecutive_failures(mut self, max: u32) -> Self {
        self.config.max_consecutive_failures = max;
        self
    }

    /// Enable or disable the fail-safe latch.
    #[must_use]
    pub fn fail_safe_mode(mut self, enabled: bool) -> Self {
        self.config.enable_fail_safe_mode = enabled;
        self
    }

    /// Enable or disable heap checks.
    #[must_use]
    pub fn memory_monitoring(mut self, enabled: bool) -> Self {
        self.config.enable_memory_monitoring = enabled;
        self
    }

    /// Enable or disable the stack check.
    #[must_use]
    pub fn stack_monitoring(mut self, enabled: bool) -> Self {
        self.config.enable_stack_monitoring = enabled;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> SafetyResult<SafetyConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Everything the firmware reads at start-up.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FirmwareConfig {
    /// Safety manager section.
    pub safety: SafetyConfig,
    /// Power manager section.
    pub power: PowerConfig,
    /// Task presets section.
    pub tasks: TaskPresets,
}

impl FirmwareConfig {
    /// Parse and validate a JSON document. Missing sections keep defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not parse or a section is
    /// invalid.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its content is
    /// rejected by [`from_json_str`](Self::from_json_str).
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), "Loaded firmware configuration");
        Ok(config)
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first section's validation error.
    pub fn validate(&self) -> ConfigResult<()> {
        self.safety.validate()?;
        self.power.validate()?;
        self.tasks.validate()?;
        Ok(())
    }

    /// Serialize as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_string(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
