//! # beatguard-power
//!
//! Activity-driven power management.
//!
//! Callers report an [`ActivityLevel`]; the [`PowerManager`] maps it to a
//! [`PowerMode`] and pushes the mode's CPU clock, peripheral power-down and
//! radio power-save settings through the platform's
//! [`PowerControl`](beatguard_platform::PowerControl). A periodic tick forces
//! power-save once the device has been idle past the configured timeout.
//!
//! | Mode | CPU | Peripherals down | Radio power-save |
//! |------|-----|------------------|------------------|
//! | performance | 240 MHz | no | no |
//! | balanced | 160 MHz | yes | no |
//! | power_save | 80 MHz | yes | yes |
//! | ultra_low_power | 40 MHz | yes | yes |
//!
//! ## Example
//!
//! ```rust
//! use beatguard_platform::{HostPlatform, ManualTimer};
//! use beatguard_power::prelude::*;
//!
//! let timer = ManualTimer::new();
//! let platform = HostPlatform::new();
//! let mut power = PowerManager::new(&timer, &platform, PowerConfig::default())?;
//!
//! power.update_activity(ActivityLevel::High);
//! assert_eq!(power.current_power_mode(), PowerMode::Performance);
//! # Ok::<(), PowerError>(())
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
pub mod mode;
pub mod prelude;

pub use config::{PowerConfig, PowerConfigBuilder};
pub use error::{PowerError, PowerResult};
pub use manager::{PowerManager, PowerStats};
pub use mode::{ActivityLevel, CPU_FREQUENCY_STEPS_MHZ, PowerMode, snap_cpu_frequency_mhz};
