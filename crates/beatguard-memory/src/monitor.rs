//! Heap and stack monitors.

use beatguard_platform::Platform;
use portable_atomic::{AtomicU32, Ordering};
use serde::{Deserialize, Serialize};

/// Free heap below this many bytes is "low".
pub const LOW_MEMORY_THRESHOLD: u32 = 8 * 1024;

/// Free heap below this many bytes is "critical".
pub const CRITICAL_MEMORY_THRESHOLD: u32 = 4 * 1024;

/// Minimum free stack bytes a task must keep.
pub const MIN_STACK_MARGIN: u32 = 512;

/// Point-in-time heap reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    /// Bytes free.
    pub free_heap: u32,
    /// Heap size.
    pub total_heap: u32,
    /// Largest contiguous free block, if known.
    pub largest_free_block: Option<u32>,
    /// Fraction of free memory not in the largest block.
    pub fragmentation: f32,
    /// Highest heap usage observed by this monitor.
    pub peak_usage: u32,
}

/// Heap monitor with its own peak-usage high-water mark.
///
/// Every heap query also updates the peak, so the mark reflects the worst
/// usage the monitor happened to observe rather than a true allocator peak.
pub struct MemoryMonitor<'a> {
    platform: &'a dyn Platform,
    peak_usage: AtomicU32,
}

impl<'a> MemoryMonitor<'a> {
    /// Create a monitor over `platform`.
    #[must_use]
    pub fn new(platform: &'a dyn Platform) -> Self {
        Self {
            platform,
            peak_usage: AtomicU32::new(0),
        }
    }

    /// Bytes currently free.
    #[must_use]
    pub fn free_heap(&self) -> u32 {
        let free = self.platform.free_heap();
        self.record_usage(free);
        free
    }

    /// Heap size.
    #[must_use]
    pub fn total_heap(&self) -> u32 {
        self.platform.total_heap()
    }

    /// Largest contiguous free block, if the allocator reports one.
    #[must_use]
    pub fn largest_free_block(&self) -> Option<u32> {
        self.platform.largest_free_block()
    }

    /// `(free - largest_block) / free`, or 0.0 when unknown or nothing is
    /// free.
    #[must_use]
    pub fn fragmentation(&self) -> f32 {
        let free = self.free_heap();
        Self::fragmentation_of(free, self.largest_free_block())
    }

    /// Highest usage seen so far.
    #[must_use]
    pub fn peak_usage(&self) -> u32 {
        self.peak_usage.load(Ordering::Acquire)
    }

    /// Free heap below [`LOW_MEMORY_THRESHOLD`].
    #[must_use]
    pub fn is_low_memory(&self) -> bool {
        self.free_heap() < LOW_MEMORY_THRESHOLD
    }

    /// Free heap below [`CRITICAL_MEMORY_THRESHOLD`].
    #[must_use]
    pub fn is_critical_memory(&self) -> bool {
        self.free_heap() < CRITICAL_MEMORY_THRESHOLD
    }

    /// Read everything at once.
    #[must_use]
    pub fn snapshot(&self) -> MemorySnapshot {
        let free_heap = self.free_heap();
        let largest_free_block = self.largest_free_block();
        MemorySnapshot {
            free_heap,
            total_heap: self.total_heap(),
            largest_free_block,
            fragmentation: Self::fragmentation_of(free_heap, largest_free_block),
            peak_usage: self.peak_usage(),
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "heap sizes fit comfortably in f32 precision for a ratio"
    )]
    fn fragmentation_of(free: u32, largest: Option<u32>) -> f32 {
        match largest {
            Some(largest) if free > 0 => {
                let scattered = free.saturating_sub(largest.min(free));
                scattered as f32 / free as f32
            }
            _ => 0.0,
        }
    }

    fn record_usage(&self, free: u32) {
        let used = self.platform.total_heap().saturating_sub(free);
        self.peak_usage.fetch_max(used, Ordering::AcqRel);
    }
}

impl core::fmt::Debug for MemoryMonitor<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemoryMonitor")
            .field("platform", &self.platform.platform_name())
            .field("peak_usage", &self.peak_usage.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

/// Stack headroom check for the calling task.
#[derive(Clone, Copy)]
pub struct StackGuard<'a> {
    platform: &'a dyn Platform,
}

impl<'a> StackGuard<'a> {
    /// Create a guard over `platform`.
    #[must_use]
    pub fn new(platform: &'a dyn Platform) -> Self {
        Self { platform }
    }

    /// Minimum free stack bytes observed. Platforms without introspection
    /// report [`MIN_STACK_MARGIN`].
    #[must_use]
    pub fn high_water_mark(&self) -> u32 {
        self.platform
            .stack_high_water_mark()
            .unwrap_or(MIN_STACK_MARGIN)
    }

    /// Whether the high-water mark keeps at least [`MIN_STACK_MARGIN`].
    #[must_use]
    pub fn check_stack_high_water_mark(&self) -> bool {
        self.high_water_mark() >= MIN_STACK_MARGIN
    }

    /// Negation of [`check_stack_high_water_mark`](Self::check_stack_high_water_mark).
    #[must_use]
    pub fn is_stack_overflow_risk(&self) -> bool {
        !self.check_stack_high_water_mark()
    }
}

impl core::fmt::Debug for StackGuard<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StackGuard")
            .field("platform", &self.platform.platform_name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beatguard_platform::HostPlatform;

    #[test]
    fn test_low_and_critical_thresholds() {
        let platform = HostPlatform::new();
        let monitor = MemoryMonitor::new(&platform);

        platform.set_free_heap(LOW_MEMORY_THRESHOLD);
        assert!(!monitor.is_low_memory());

        platform.set_free_heap(LOW_MEMORY_THRESHOLD - 1);
        assert!(monitor.is_low_memory());
        assert!(!monitor.is_critical_memory());

        platform.set_free_heap(CRITICAL_MEMORY_THRESHOLD - 1);
        assert!(monitor.is_critical_memory());
    }

    #[test]
    fn test_fragmentation_ratio() {
        let platform = HostPlatform::builder().free_heap(1000).build();
        let monitor = MemoryMonitor::new(&platform);
        assert!(monitor.fragmentation().abs() < f32::EPSILON);

        platform.set_largest_free_block(Some(250));
        assert!((monitor.fragmentation() - 0.75).abs() < 1e-6);

        platform.set_free_heap(0);
        assert!(monitor.fragmentation().abs() < f32::EPSILON);
    }

    #[test]
    fn test_peak_usage_tracks_worst_query() {
        let platform = HostPlatform::builder()
            .total_heap(10_000)
            .free_heap(9_000)
            .build();
        let monitor = MemoryMonitor::new(&platform);
        assert_eq!(monitor.free_heap(), 2_000);
        platform.set_free_heap(2_000);
        assert_eq!(monitor.free_heap(), 2_000);
        platform.set_free_heap(7_000);
        assert_eq!(monitor.free_heap(), 2_000);
        assert_eq!(monitor.peak_usage(), 8_000);
    }

    #[test]
    fn test_monitors_have_independent_peaks() {
        let platform = HostPlatform::builder()
            .total_heap(10_000)
            .free_heap(1_000)
            .build();
        let a = MemoryMonitor::new(&platform);
        let b = MemoryMonitor::new(&platform);
        let _ = a.free_heap();
        assert_eq!(a.peak_usage(), 9_000);
        assert_eq!(b.peak_usage(), 0);
    }

    #[test]
    fn test_stack_guard_without_introspection_is_healthy() {
        let platform = HostPlatform::new();
        let guard = StackGuard::new(&platform);
        assert_eq!(guard.high_water_mark(), MIN_STACK_MARGIN);
        assert!(guard.check_stack_high_water_mark());
        assert!(!guard.is_stack_overflow_risk());
    }

    #[test]
    fn test_stack_guard_flags_thin_margin() {
        let platform = HostPlatform::builder().stack_high_water_mark(300).build();
        let guard = StackGuard::new(&platform);
        assert!(guard.is_stack_overflow_risk());
    }

    #[test]
    fn test_debug_names_platform() {
        let platform = HostPlatform::builder().name("bench-rig").free_heap(2_000).build();
        let monitor = MemoryMonitor::new(&platform);
        assert_eq!(monitor.free_heap(), 2_000);
        let text = format!("{monitor:?}");
        assert!(text.contains("bench-rig"));
        assert!(text.contains("peak_usage"));
        assert!(format!("{:?}", StackGuard::new(&platform)).contains("bench-rig"));
    }
}
