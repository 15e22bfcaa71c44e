//! Fault reports.

use crate::code::{ErrorCode, ErrorSeverity};
use core::panic::Location;

/// Maximum message length retained in an [`ErrorContext`].
pub const MAX_MESSAGE_LEN: usize = 96;

/// Bounded, allocation-free message storage.
pub type ErrorMessage = heapless::String<MAX_MESSAGE_LEN>;

/// A single fault fact, consumed once by an error handler.
///
/// The message is truncated to [`MAX_MESSAGE_LEN`] bytes at a character
/// boundary. The source location is captured from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Fault code.
    pub code: ErrorCode,
    /// Fault severity.
    pub severity: ErrorSeverity,
    /// Free-text description.
    pub message: ErrorMessage,
    /// Where the fault was reported.
    pub location: Option<&'static Location<'static>>,
    /// Monotonic time of the report in milliseconds.
    pub timestamp_ms: u64,
    /// Opaque reporter-defined value (task id, register, byte count, ...).
    pub context: Option<u32>,
}

impl ErrorContext {
    /// Create a report at the caller's location.
    #[must_use]
    #[track_caller]
    pub fn new(
        code: ErrorCode,
        severity: ErrorSeverity,
        message: &str,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            code,
            severity,
            message: truncate_message(message),
            location: Some(Location::caller()),
            timestamp_ms,
            context: None,
        }
    }

    /// Create a report using the code's default severity.
    #[must_use]
    #[track_caller]
    pub fn with_default_severity(code: ErrorCode, message: &str, timestamp_ms: u64) -> Self {
        Self::new(code, code.default_severity(), message, timestamp_ms)
    }

    /// Attach an opaque context value.
    #[must_use]
    pub fn with_context(mut self, value: u32) -> Self {
        self.context = Some(value);
        self
    }

    /// Override the recorded source location.
    #[must_use]
    pub fn at(mut self, location: &'static Location<'static>) -> Self {
        self.location = Some(location);
        self
    }

    /// Drop the source location (for reports that cross task boundaries).
    #[must_use]
    pub fn without_location(mut self) -> Self {
        self.location = None;
        self
    }

    /// Whether the report latches fail-safe mode.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.severity.latches_fail_safe()
    }
}

impl core::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Error [{}] {} ({}): {}",
            self.severity,
            self.code,
            self.code.code(),
            self.message
        )?;
        if let Some(value) = self.context {
            write!(f, " [ctx={value}]")?;
        }
        if let Some(location) = self.location {
            write!(f, " ({}:{})", location.file(), location.line())?;
        }
        Ok(())
    }
}

fn truncate_message(message: &str) -> ErrorMessage {
    let mut out = ErrorMessage::new();
    for ch in message.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
