//! Convenience re-exports for watchdog consumers.

pub use crate::device::{Watchdog, WatchdogDevice};
pub use crate::error::{WatchdogError, WatchdogResult};
pub use crate::factory::WatchdogFactory;
pub use crate::guard::CriticalSectionGuard;
pub use crate::hardware::HardwareWatchdog;
pub use crate::manager::{
    DEFAULT_TIMEOUT_MS, HealthCheckFn, MAX_CONSECUTIVE_FAILURES, WatchdogManager, WatchdogStatus,
};
pub use crate::software::SoftwareWatchdog;
pub use crate::state::{WatchdogKind, WatchdogMetrics, WatchdogState};
