//! Error types for platform operations.

use thiserror::Error;

/// Errors reported by platform primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The watchdog peripheral rejected its configuration.
    #[error("Watchdog peripheral error: {0}")]
    WatchdogPeripheral(String),

    /// The requested peripheral is not present on this platform.
    #[error("Peripheral not available: {0}")]
    Unavailable(&'static str),

    /// A power knob could not be applied.
    #[error("Power control error: {0}")]
    PowerControl(String),
}

impl PlatformError {
    /// Create a watchdog peripheral error.
    #[must_use]
    pub fn watchdog_peripheral(msg: impl Into<String>) -> Self {
        Self::WatchdogPeripheral(msg.into())
    }

    /// Create a power control error.
    #[must_use]
    pub fn power_control(msg: impl Into<String>) -> Self {
        Self::PowerControl(msg.into())
    }
}

/// A specialized `Result` type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            PlatformError::watchdog_peripheral("timeout out of range").to_string(),
            "Watchdog peripheral error: timeout out of range"
        );
        assert_eq!(
            PlatformError::Unavailable("watchdog").to_string(),
            "Peripheral not available: watchdog"
        );
    }
}
