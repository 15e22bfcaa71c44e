//! Convenience re-exports for tests.

pub use crate::fixtures::{HEALTHY_FREE_HEAP, SafetyFixture, TOTAL_HEAP};
pub use crate::health::HealthSwitch;
pub use crate::logger::{LogEntry, RecordingLogger};
pub use crate::must::{must, must_some};
