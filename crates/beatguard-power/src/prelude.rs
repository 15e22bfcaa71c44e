//! Convenience re-exports for power management.

pub use crate::config::{PowerConfig, PowerConfigBuilder};
pub use crate::error::{PowerError, PowerResult};
pub use crate::manager::{PowerManager, PowerStats};
pub use crate::mode::{ActivityLevel, PowerMode};
