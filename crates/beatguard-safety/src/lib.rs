//! # beatguard-safety
//!
//! The root of the BeatGuard safety substrate.
//!
//! [`SafetyManager`] owns the error handler and the watchdog manager, runs
//! the periodic health and memory checks, and exposes the single fail-safe
//! and recovery state machine. Faults raised on other tasks travel through
//! an [`ErrorReporter`]; the published state is readable anywhere through a
//! [`SafetyMonitor`].
//!
//! ```text
//! periodic task ──► execute_safety_checks()
//!                     1. drain ErrorReporter queue ──► DefaultErrorHandler
//!                     2. health check (interval)   ──► low memory / stack / custom
//!                     3. memory check (interval)   ──► usage and fragmentation warnings
//!                     4. all passed? ──► WatchdogManager::check_health_and_feed()
//! ```
//!
//! [`FirmwareConfig`] bundles the safety, power and task sections read at
//! start-up.
//!
//! ## Example
//!
//! ```rust
//! use beatguard_memory::MemoryMonitor;
//! use beatguard_platform::{HostPlatform, ManualTimer, TracingLogger};
//! use beatguard_safety::prelude::*;
//! use std::sync::Arc;
//!
//! let platform = HostPlatform::new();
//! let timer = ManualTimer::new();
//! let logger = TracingLogger::new();
//! let memory = MemoryMonitor::new(&platform);
//!
//! let config = SafetyConfig::builder()
//!     .watchdog_timeout_ms(10_000)
//!     .health_check_interval_ms(1_000)
//!     .build()?;
//! let mut safety = SafetyManager::new(&platform, &timer, &logger, &memory, config)?;
//! safety.register_health_check(Arc::new(|| true));
//!
//! for _ in 0..10 {
//!     timer.advance_ms(1_000);
//!     assert!(safety.execute_safety_checks());
//! }
//! assert!(!safety.is_in_fail_safe_mode());
//! # Ok::<(), SafetyError>(())
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

pub mod config;
pub mod error;
pub mod manager;
pub mod monitor;
pub mod prelude;

pub use config::{FirmwareConfig, SafetyConfig, SafetyConfigBuilder};
pub use error::{ConfigError, ConfigResult, SafetyError, SafetyResult};
pub use manager::{HIGH_FRAGMENTATION_RATIO, HIGH_HEAP_USAGE_PERCENT, SafetyManager, SafetyStatus};
pub use monitor::{ErrorReporter, REPORT_QUEUE_CAPACITY, SafetyMonitor};
