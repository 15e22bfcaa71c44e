//! Convenience re-exports for platform consumers.

pub use crate::error::{PlatformError, PlatformResult};
pub use crate::host::{HostPlatform, HostPlatformBuilder, SimulatedWatchdogPeripheral};
pub use crate::logger::{LogLevel, Logger, TracingLogger};
pub use crate::platform::{Platform, PowerControl, WatchdogPeripheral};
pub use crate::timer::{ManualTimer, StdTimer, Timer};
