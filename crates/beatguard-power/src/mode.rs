//! Power modes and activity levels.

use serde::{Deserialize, Serialize};

/// Supported CPU clock steps in MHz, fastest first.
pub const CPU_FREQUENCY_STEPS_MHZ: [u32; 4] = [240, 160, 80, 40];

/// Snap a requested clock to the nearest supported step at or below it
/// (minimum 40 MHz).
#[must_use]
pub fn snap_cpu_frequency_mhz(requested: u32) -> u32 {
    CPU_FREQUENCY_STEPS_MHZ
        .iter()
        .copied()
        .find(|step| requested >= *step)
        .unwrap_or(40)
}

/// Named operating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerMode {
    /// Full clock, everything powered.
    Performance,
    /// Reduced clock, idle peripherals powered down.
    #[default]
    Balanced,
    /// Low clock, radio power-save.
    PowerSave,
    /// Minimum clock.
    UltraLowPower,
}

impl PowerMode {
    /// CPU clock applied in this mode.
    #[must_use]
    pub fn cpu_frequency_mhz(self) -> u32 {
        match self {
            Self::Performance => 240,
            Self::Balanced => 160,
            Self::PowerSave => 80,
            Self::UltraLowPower => 40,
        }
    }

    /// Whether idle peripherals are powered down in this mode.
    #[must_use]
    pub fn peripheral_power_down(self) -> bool {
        !matches!(self, Self::Performance)
    }

    /// Whether the radio runs in power-save in this mode.
    #[must_use]
    pub fn radio_power_save(self) -> bool {
        matches!(self, Self::PowerSave | Self::UltraLowPower)
    }

    /// Mode prescribed for an activity level.
    #[must_use]
    pub fn for_activity(level: ActivityLevel) -> Self {
        match level {
            ActivityLevel::Idle | ActivityLevel::Low => Self::PowerSave,
            ActivityLevel::Moderate => Self::Balanced,
            ActivityLevel::High | ActivityLevel::Critical => Self::Performance,
        }
    }

    /// Get the mode as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Performance => "performance",
            Self::Balanced => "balanced",
            Self::PowerSave => "power_save",
            Self::UltraLowPower => "ultra_low_power",
        }
    }
}

impl core::fmt::Display for PowerMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied workload intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Nothing to do.
    Idle,
    /// Light background work.
    Low,
    /// Normal operation.
    #[default]
    Moderate,
    /// Heavy processing.
    High,
    /// Latency-critical processing.
    Critical,
}

impl ActivityLevel {
    /// Get the level as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl core::fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
