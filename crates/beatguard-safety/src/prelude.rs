//! Convenience re-exports for firmware start-up code.

pub use crate::config::{FirmwareConfig, SafetyConfig, SafetyConfigBuilder};
pub use crate::error::{ConfigError, SafetyError, SafetyResult};
pub use crate::manager::{SafetyManager, SafetyStatus};
pub use crate::monitor::{ErrorReporter, SafetyMonitor};
pub use beatguard_errors::{ErrorCode, ErrorSeverity};
