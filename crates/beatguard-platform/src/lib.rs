//! # beatguard-platform
//!
//! The narrow interfaces the BeatGuard safety substrate consumes from the
//! surrounding firmware: a monotonic clock, a leveled log sink, heap and stack
//! introspection, the restart primitive, power knobs and an optional hardware
//! watchdog peripheral.
//!
//! Every collaborator in the other BeatGuard crates borrows these through
//! `&dyn Trait` references, so the core never depends on a concrete SDK.
//!
//! ## Provided implementations
//!
//! - [`StdTimer`]: wall clock backed by `std::time::Instant`
//! - [`ManualTimer`]: simulated clock advanced explicitly by tests and the
//!   host simulator
//! - [`TracingLogger`]: forwards firmware log lines to `tracing`
//! - [`HostPlatform`]: simulated microcontroller with adjustable heap, stack
//!   and watchdog peripheral state
//!
//! ## Example
//!
//! ```rust
//! use beatguard_platform::prelude::*;
//!
//! let timer = ManualTimer::new();
//! let platform = HostPlatform::builder().total_heap(320 * 1024).build();
//!
//! timer.advance_ms(250);
//! assert_eq!(timer.millis(), 250);
//! assert!(platform.free_heap() <= platform.total_heap());
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
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod host;
pub mod logger;
pub mod platform;
pub mod prelude;
pub mod timer;

pub use error::{PlatformError, PlatformResult};
pub use host::{HostPlatform, HostPlatformBuilder, SimulatedWatchdogPeripheral};
pub use logger::{LogLevel, Logger, TracingLogger};
pub use platform::{Platform, PowerControl, WatchdogPeripheral};
pub use timer::{ManualTimer, StdTimer, Timer};
