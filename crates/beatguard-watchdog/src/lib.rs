//! # beatguard-watchdog
//!
//! Watchdog devices and the health-gated manager that feeds them.
//!
//! - [`Watchdog`]: the device interface (initialize, feed, force reset,
//!   remaining time)
//! - [`HardwareWatchdog`]: the platform's countdown peripheral
//! - [`SoftwareWatchdog`]: polled fallback with a weaker guarantee
//! - [`WatchdogDevice`]: the tagged device chosen once by [`WatchdogFactory`]
//! - [`WatchdogManager`]: sole owner of the device; feeds only on healthy
//!   checks and latches fail-safe mode after repeated failures
//! - [`CriticalSectionGuard`]: feeds on entry and on every exit path
//!
//! ## Escalation
//!
//! ```text
//! check_health_and_feed()
//!   ├─ healthy ──► feed, failures = 0
//!   └─ unhealthy ─► failures += 1 ──(failures >= 3)──► fail-safe latch (still fed)
//!
//! attempt_recovery(): clears the latch only with memory OK and failures == 0
//! ```
//!
//! ## Example
//!
//! ```rust
//! use beatguard_watchdog::prelude::*;
//! use beatguard_memory::MemoryMonitor;
//! use beatguard_platform::{HostPlatform, ManualTimer, TracingLogger};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), WatchdogError> {
//! let platform = HostPlatform::new();
//! let timer = ManualTimer::new();
//! let logger = TracingLogger::new();
//! let memory = MemoryMonitor::new(&platform);
//!
//! let device = WatchdogFactory::create(&platform, &timer, DEFAULT_TIMEOUT_MS)?;
//! let mut manager = WatchdogManager::new(device, &memory, &logger);
//! manager.register_health_check(Arc::new(|| true));
//!
//! assert!(manager.check_health_and_feed());
//! assert!(!manager.is_in_fail_safe_mode());
//! # Ok(())
//! # }
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]

pub mod device;
pub mod error;
pub mod factory;
pub mod guard;
pub mod hardware;
pub mod manager;
pub mod prelude;
pub mod software;
pub mod state;

pub use device::{Watchdog, WatchdogDevice};
pub use error::{WatchdogError, WatchdogResult};
pub use factory::WatchdogFactory;
pub use guard::CriticalSectionGuard;
pub use hardware::HardwareWatchdog;
pub use manager::{
    DEFAULT_TIMEOUT_MS, HealthCheckFn, MAX_CONSECUTIVE_FAILURES, WatchdogManager, WatchdogStatus,
};
pub use software::SoftwareWatchdog;
pub use state::{WatchdogKind, WatchdogMetrics, WatchdogState};
