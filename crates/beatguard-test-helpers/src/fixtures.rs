//! Bundled simulated collaborators.

use crate::logger::RecordingLogger;
use beatguard_platform::{HostPlatform, ManualTimer};

/// Healthy free-heap reading used by fixtures (well above 8 KiB).
pub const HEALTHY_FREE_HEAP: u32 = 200 * 1024;

/// Total heap of the simulated device.
pub const TOTAL_HEAP: u32 = 320 * 1024;

/// Simulated clock, device and log sink for safety tests.
///
/// Components under test borrow the fields, so the fixture must outlive them:
/// declare it first in the test.
#[derive(Debug)]
pub struct SafetyFixture {
    /// Manually advanced clock starting at zero.
    pub timer: ManualTimer,
    /// Simulated device.
    pub platform: HostPlatform,
    /// Recording log sink.
    pub logger: RecordingLogger,
}

impl SafetyFixture {
    /// Healthy device with a hardware watchdog.
    #[must_use]
    pub fn new() -> Self {
        Self::with_platform(
            HostPlatform::builder()
                .total_heap(TOTAL_HEAP)
                .free_heap(HEALTHY_FREE_HEAP)
                .largest_free_block(HEALTHY_FREE_HEAP)
                .stack_high_water_mark(2048)
                .build(),
        )
    }

    /// Healthy device without a hardware watchdog.
    #[must_use]
    pub fn without_hardware_watchdog() -> Self {
        Self::with_platform(
            HostPlatform::builder()
                .total_heap(TOTAL_HEAP)
                .free_heap(HEALTHY_FREE_HEAP)
                .largest_free_block(HEALTHY_FREE_HEAP)
                .stack_high_water_mark(2048)
                .with_watchdog(false)
                .build(),
        )
    }

    /// Fixture around a caller-built platform.
    #[must_use]
    pub fn with_platform(platform: HostPlatform) -> Self {
        Self {
            timer: ManualTimer::new(),
            platform,
            logger: RecordingLogger::new(),
        }
    }
}

impl Default for SafetyFixture {
    fn default() -> Self {
        Self::new()
    }
}
