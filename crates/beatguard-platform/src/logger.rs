//! Leveled firmware log sink.

use serde::{Deserialize, Serialize};

/// Severity of a firmware log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LogLevel {
    /// Verbose diagnostics.
    Debug = 0,
    /// Normal operation.
    Info = 1,
    /// Something unexpected but tolerated.
    Warning = 2,
    /// A failed operation.
    Error = 3,
    /// The device is about to degrade or restart.
    Critical = 4,
}

impl LogLevel {
    /// Get the level as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARN",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl core::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sink for firmware log lines tagged with the emitting component.
pub trait Logger: Send + Sync {
    /// Emit one line.
    fn log(&self, level: LogLevel, component: &str, message: &str);

    /// Emit at [`LogLevel::Debug`].
    fn debug(&self, component: &str, message: &str) {
        self.log(LogLevel::Debug, component, message);
    }

    /// Emit at [`LogLevel::Info`].
    fn info(&self, component: &str, message: &str) {
        self.log(LogLevel::Info, component, message);
    }

    /// Emit at [`LogLevel::Warning`].
    fn warning(&self, component: &str, message: &str) {
        self.log(LogLevel::Warning, component, message);
    }

    /// Emit at [`LogLevel::Error`].
    fn error(&self, component: &str, message: &str) {
        self.log(LogLevel::Error, component, message);
    }

    /// Emit at [`LogLevel::Critical`].
    fn critical(&self, component: &str, message: &str) {
        self.log(LogLevel::Critical, component, message);
    }
}

/// Logger that forwards every line to `tracing`.
///
/// `Critical` has no direct `tracing` level; it is emitted as an `ERROR`
/// event carrying `critical = true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    /// Create a new forwarding logger.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, component: &str, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(component, "{message}"),
            LogLevel::Info => tracing::info!(component, "{message}"),
            LogLevel::Warning => tracing::warn!(component, "{message}"),
            LogLevel::Error => tracing::error!(component, "{message}"),
            LogLevel::Critical => tracing::error!(component, critical = true, "{message}"),
        }
    }
}
