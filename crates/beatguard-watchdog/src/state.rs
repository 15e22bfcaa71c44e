//! Watchdog device states and manager metrics.

use serde::{Deserialize, Serialize};

/// Device lifecycle.
///
/// ```text
/// Uninitialized ──initialize()──► Active ──(no feed for timeout)──► Starved
///                                   ▲  │                               │
///                                   └──┘ feed()                 force_reset()
///                                                                      ▼
///                                                                    Reset
/// ```
///
/// `Reset` is terminal until the device is initialised again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum WatchdogState {
    /// Not armed.
    #[default]
    Uninitialized = 0,
    /// Armed, countdown running.
    Active = 1,
    /// Armed, countdown reached zero.
    Starved = 2,
    /// The device forced a restart.
    Reset = 3,
}

impl WatchdogState {
    /// Convert from raw value.
    #[must_use]
    pub fn from_raw(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Uninitialized),
            1 => Some(Self::Active),
            2 => Some(Self::Starved),
            3 => Some(Self::Reset),
            _ => None,
        }
    }

    /// Convert to raw value.
    #[must_use]
    pub fn to_raw(self) -> u8 {
        self as u8
    }

    /// Whether the countdown is armed (running or expired).
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active | Self::Starved)
    }

    /// Whether only re-initialisation leaves this state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Reset)
    }

    /// Get the state as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "Uninitialized",
            Self::Active => "Active",
            Self::Starved => "Starved",
            Self::Reset => "Reset",
        }
    }
}

impl core::fmt::Display for WatchdogState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which device backs a watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WatchdogKind {
    /// Platform countdown peripheral; resets the device on its own.
    Hardware,
    /// Polled comparison against the timer; detects starvation only when
    /// polled.
    Software,
}

impl WatchdogKind {
    /// Get the kind as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hardware => "hardware",
            Self::Software => "software",
        }
    }
}

/// Counters kept by the watchdog manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchdogMetrics {
    /// Successful feeds.
    pub feed_count: u64,
    /// Health checks that refused to feed.
    pub failed_checks: u64,
    /// Transitions into fail-safe mode.
    pub fail_safe_entries: u32,
    /// Transitions out of fail-safe mode.
    pub recoveries: u32,
}

impl WatchdogMetrics {
    /// Record a feed.
    pub fn record_feed(&mut self) {
        self.feed_count = self.feed_count.saturating_add(1);
    }

    /// Record a failed health check.
    pub fn record_failed_check(&mut self) {
        self.failed_checks = self.failed_checks.saturating_add(1);
    }

    /// Record a fail-safe entry.
    pub fn record_fail_safe_entry(&mut self) {
        self.fail_safe_entries = self.fail_safe_entries.saturating_add(1);
    }

    /// Record a recovery.
    pub fn record_recovery(&mut self) {
        self.recoveries = self.recoveries.saturating_add(1);
    }
}
