//! Error types for watchdog operations.

use beatguard_platform::PlatformError;
use thiserror::Error;

/// Errors that can occur during watchdog operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchdogError {
    /// Timeout must be non-zero.
    #[error("Invalid watchdog timeout: {0} ms")]
    InvalidTimeout(u32),

    /// The device has not been initialised.
    #[error("Watchdog is not initialized")]
    NotInitialized,

    /// The device already forced a reset and must be re-initialised.
    #[error("Watchdog has already forced a reset")]
    AlreadyReset,

    /// The platform has no hardware watchdog peripheral.
    #[error("Hardware watchdog not available")]
    HardwareUnavailable,

    /// The peripheral rejected an operation.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// A specialized `Result` type for watchdog operations.
pub type WatchdogResult<T> = Result<T, WatchdogError>;
