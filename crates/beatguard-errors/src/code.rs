//! Fault taxonomy: error codes, severities and recovery strategies.
//!
//! Codes are grouped by subsystem in blocks of one hundred so the numeric value
//! alone identifies where a fault originated.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Firmware fault code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u16)]
pub enum ErrorCode {
    // General (0-99)
    /// No error.
    Success = 0,
    /// Unclassified fault.
    Unknown = 1,
    /// A caller passed an invalid argument.
    InvalidParameter = 2,
    /// An operation did not finish in time.
    Timeout = 3,
    /// A required resource is busy or missing.
    ResourceUnavailable = 4,

    // Memory (100-199)
    /// Heap allocation failed.
    MemoryAllocationFailed = 100,
    /// Memory contents are inconsistent.
    MemoryCorruption = 101,
    /// The current task's stack overflowed or is about to.
    StackOverflow = 102,
    /// Heap metadata is inconsistent or badly fragmented.
    HeapCorruption = 103,

    // Signal pipeline (200-299)
    /// Sampling front-end failed to initialise.
    SignalInitFailed = 200,
    /// Sample buffer overran.
    SignalBufferOverflow = 201,
    /// Spectral computation produced an invalid result.
    SignalComputationError = 202,
    /// Beat detection produced no usable estimate.
    DetectionFailed = 203,

    // Platform / HAL (300-399)
    /// Platform bring-up failed.
    PlatformInitFailed = 300,
    /// Serial port bring-up failed.
    SerialInitFailed = 301,
    /// Hardware timer bring-up failed.
    TimerInitFailed = 302,
    /// GPIO bring-up failed.
    GpioInitFailed = 303,

    // Communication (400-499)
    /// Outgoing transfer failed.
    TransmitFailed = 400,
    /// Incoming transfer failed.
    ReceiveFailed = 401,
    /// Peer violated the protocol.
    ProtocolError = 402,
    /// Communication buffer overran.
    CommBufferOverflow = 403,

    // Tasks (500-599)
    /// The scheduler refused to create a task.
    TaskCreationFailed = 500,
    /// A task's stack overflowed.
    TaskStackOverflow = 501,
    /// An inter-task queue was full.
    QueueFull = 502,
    /// A lock could not be acquired in time.
    LockTimeout = 503,

    // Safety (600-699)
    /// The watchdog expired.
    WatchdogTimeout = 600,
    /// A health check reported failure.
    HealthCheckFailed = 601,
    /// The system entered fail-safe mode.
    FailSafeMode = 602,
    /// The fault can only be cleared by a restart.
    SystemResetRequired = 603,
}

/// Raw value that does not name an [`ErrorCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unknown error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl ErrorCode {
    /// All codes in numeric order.
    pub const ALL: [Self; 29] = [
        Self::Success,
        Self::Unknown,
        Self::InvalidParameter,
        Self::Timeout,
        Self::ResourceUnavailable,
        Self::MemoryAllocationFailed,
        Self::MemoryCorruption,
        Self::StackOverflow,
        Self::HeapCorruption,
        Self::SignalInitFailed,
        Self::SignalBufferOverflow,
        Self::SignalComputationError,
        Self::DetectionFailed,
        Self::PlatformInitFailed,
        Self::SerialInitFailed,
        Self::TimerInitFailed,
        Self::GpioInitFailed,
        Self::TransmitFailed,
        Self::ReceiveFailed,
        Self::ProtocolError,
        Self::CommBufferOverflow,
        Self::TaskCreationFailed,
        Self::TaskStackOverflow,
        Self::QueueFull,
        Self::LockTimeout,
        Self::WatchdogTimeout,
        Self::HealthCheckFailed,
        Self::FailSafeMode,
        Self::SystemResetRequired,
    ];

    /// Numeric value of the code.
    #[must_use]
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Look up a code by its numeric value.
    #[must_use]
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }

    /// Subsystem block the code belongs to.
    #[must_use]
    pub fn category(self) -> &'static str {
        match self.code() / 100 {
            0 => "general",
            1 => "memory",
            2 => "signal",
            3 => "platform",
            4 => "communication",
            5 => "task",
            _ => "safety",
        }
    }

    /// Severity used when a reporter does not choose one explicitly.
    #[must_use]
    pub fn default_severity(self) -> ErrorSeverity {
        match self {
            Self::Success => ErrorSeverity::Debug,
            Self::Timeout | Self::ResourceUnavailable => ErrorSeverity::Warning,
            Self::MemoryCorruption
            | Self::StackOverflow
            | Self::HeapCorruption
            | Self::TaskStackOverflow
            | Self::WatchdogTimeout => ErrorSeverity::Critical,
            Self::SystemResetRequired => ErrorSeverity::Fatal,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get the code as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Unknown => "UNKNOWN_ERROR",
            Self::InvalidParameter => "INVALID_PARAMETER",
            Self::Timeout => "TIMEOUT",
            Self::ResourceUnavailable => "RESOURCE_UNAVAILABLE",
            Self::MemoryAllocationFailed => "MEMORY_ALLOCATION_FAILED",
            Self::MemoryCorruption => "MEMORY_CORRUPTION",
            Self::StackOverflow => "STACK_OVERFLOW",
            Self::HeapCorruption => "HEAP_CORRUPTION",
            Self::SignalInitFailed => "SIGNAL_INIT_FAILED",
            Self::SignalBufferOverflow => "SIGNAL_BUFFER_OVERFLOW",
            Self::SignalComputationError => "SIGNAL_COMPUTATION_ERROR",
            Self::DetectionFailed => "DETECTION_FAILED",
            Self::PlatformInitFailed => "PLATFORM_INIT_FAILED",
            Self::SerialInitFailed => "SERIAL_INIT_FAILED",
            Self::TimerInitFailed => "TIMER_INIT_FAILED",
            Self::GpioInitFailed => "GPIO_INIT_FAILED",
            Self::TransmitFailed => "TRANSMIT_FAILED",
            Self::ReceiveFailed => "RECEIVE_FAILED",
            Self::ProtocolError => "PROTOCOL_ERROR",
            Self::CommBufferOverflow => "COMM_BUFFER_OVERFLOW",
            Self::TaskCreationFailed => "TASK_CREATION_FAILED",
            Self::TaskStackOverflow => "TASK_STACK_OVERFLOW",
            Self::QueueFull => "QUEUE_FULL",
            Self::LockTimeout => "LOCK_TIMEOUT",
            Self::WatchdogTimeout => "WATCHDOG_TIMEOUT",
            Self::HealthCheckFailed => "HEALTH_CHECK_FAILED",
            Self::FailSafeMode => "FAIL_SAFE_MODE",
            Self::SystemResetRequired => "SYSTEM_RESET_REQUIRED",
        }
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::from_code(value).ok_or(InvalidErrorCode(value))
    }
}

impl core::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fault severity, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Diagnostic detail.
    Debug = 0,
    /// Informational.
    Info = 1,
    /// Tolerated anomaly.
    Warning = 2,
    /// Failed operation, handled locally.
    #[default]
    Error = 3,
    /// Fault that latches fail-safe mode.
    Critical = 4,
    /// Fault that requires a restart.
    Fatal = 5,
}

impl ErrorSeverity {
    /// Whether this severity latches fail-safe mode.
    #[must_use]
    pub fn latches_fail_safe(self) -> bool {
        self >= Self::Critical
    }

    /// Get the severity as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
            Self::Fatal => "FATAL",
        }
    }
}

impl core::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the firmware should do about a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum RecoveryStrategy {
    /// Nothing to do.
    #[default]
    None = 0,
    /// Retry the failed operation.
    Retry = 1,
    /// Reinitialise the failing component.
    ResetComponent = 2,
    /// Reinitialise the owning subsystem.
    ResetSubsystem = 3,
    /// Degrade into fail-safe mode.
    FailSafe = 4,
    /// Restart the device.
    SystemReset = 5,
}

impl RecoveryStrategy {
    /// Get the strategy as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Retry => "RETRY",
            Self::ResetComponent => "RESET_COMPONENT",
            Self::ResetSubsystem => "RESET_SUBSYSTEM",
            Self::FailSafe => "FAIL_SAFE",
            Self::SystemReset => "SYSTEM_RESET",
        }
    }
}

impl core::fmt::Display for RecoveryStrategy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_grouped_by_subsystem() {
        assert_eq!(ErrorCode::Timeout.category(), "general");
        assert_eq!(ErrorCode::HeapCorruption.category(), "memory");
        assert_eq!(ErrorCode::DetectionFailed.category(), "signal");
        assert_eq!(ErrorCode::GpioInitFailed.category(), "platform");
        assert_eq!(ErrorCode::ProtocolError.category(), "communication");
        assert_eq!(ErrorCode::LockTimeout.category(), "task");
        assert_eq!(ErrorCode::FailSafeMode.category(), "safety");
    }

    #[test]
    fn test_from_code() {
        assert_eq!(ErrorCode::from_code(600), Some(ErrorCode::WatchdogTimeout));
        assert_eq!(ErrorCode::from_code(104), None);
        assert_eq!(ErrorCode::try_from(9999), Err(InvalidErrorCode(9999)));
    }

    #[test]
    fn test_all_is_sorted_and_unique() {
        for pair in ErrorCode::ALL.windows(2) {
            if let [a, b] = pair {
                assert!(a.code() < b.code());
            }
        }
    }

    #[test]
    fn test_default_severity() {
        assert_eq!(ErrorCode::Success.default_severity(), ErrorSeverity::Debug);
        assert_eq!(ErrorCode::Timeout.default_severity(), ErrorSeverity::Warning);
        assert_eq!(
            ErrorCode::MemoryAllocationFailed.default_severity(),
            ErrorSeverity::Error
        );
        assert_eq!(
            ErrorCode::WatchdogTimeout.default_severity(),
            ErrorSeverity::Critical
        );
        assert_eq!(
            ErrorCode::SystemResetRequired.default_severity(),
            ErrorSeverity::Fatal
        );
    }

    #[test]
    fn test_severity_latch_threshold() {
        assert!(!ErrorSeverity::Error.latches_fail_safe());
        assert!(ErrorSeverity::Critical.latches_fail_safe());
        assert!(ErrorSeverity::Fatal.latches_fail_safe());
    }
}
