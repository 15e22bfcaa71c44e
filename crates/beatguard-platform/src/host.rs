//! Simulated microcontroller for host builds and tests.

use crate::error::{PlatformError, PlatformResult};
use crate::platform::{Platform, PowerControl, WatchdogPeripheral};
use parking_lot::Mutex;
use portable_atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

/// Watchdog peripheral that records configuration and feeds.
#[derive(Debug, Default)]
pub struct SimulatedWatchdogPeripheral {
    timeout_ms: AtomicU32,
    enabled: AtomicBool,
    feed_count: AtomicU64,
    reject_configure: AtomicBool,
}

impl SimulatedWatchdogPeripheral {
    /// Create a disarmed peripheral.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `configure` calls fail, simulating a broken peripheral.
    pub fn set_reject_configure(&self, reject: bool) {
        self.reject_configure.store(reject, Ordering::Release);
    }

    /// Timeout from the last successful `configure`.
    #[must_use]
    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms.load(Ordering::Acquire)
    }

    /// Number of feeds received.
    #[must_use]
    pub fn feed_count(&self) -> u64 {
        self.feed_count.load(Ordering::Acquire)
    }
}

impl WatchdogPeripheral for SimulatedWatchdogPeripheral {
    fn configure(&self, timeout_ms: u32) -> PlatformResult<()> {
        if self.reject_configure.load(Ordering::Acquire) {
            return Err(PlatformError::watchdog_peripheral("configure rejected"));
        }
        if timeout_ms == 0 {
            return Err(PlatformError::watchdog_peripheral(
                "timeout must be non-zero",
            ));
        }
        self.timeout_ms.store(timeout_ms, Ordering::Release);
        self.enabled.store(true, Ordering::Release);
        Ok(())
    }

    fn feed(&self) {
        self.feed_count.fetch_add(1, Ordering::AcqRel);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone)]
struct HostState {
    free_heap: u32,
    total_heap: u32,
    largest_free_block: Option<u32>,
    stack_high_water_mark: Option<u32>,
    cpu_frequency_mhz: u32,
    peripheral_power_down: bool,
    radio_power_save: bool,
    slept_ms: u64,
}

/// In-memory platform whose readings are set by the caller.
///
/// Restarts are recorded rather than performed.
#[derive(Debug)]
pub struct HostPlatform {
    name: String,
    chip_id: u64,
    state: Mutex<HostState>,
    restart_count: AtomicU32,
    watchdog: Option<SimulatedWatchdogPeripheral>,
}

impl HostPlatform {
    /// Create a platform with default readings (320 KiB heap, 200 KiB free,
    /// 240 MHz, hardware watchdog present).
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a platform builder.
    #[must_use]
    pub fn builder() -> HostPlatformBuilder {
        HostPlatformBuilder::default()
    }

    /// Set the free heap reading. Clamped to the total heap.
    pub fn set_free_heap(&self, bytes: u32) {
        let mut state = self.state.lock();
        state.free_heap = bytes.min(state.total_heap);
    }

    /// Set the largest free block reading.
    pub fn set_largest_free_block(&self, bytes: Option<u32>) {
        self.state.lock().largest_free_block = bytes;
    }

    /// Set the stack high-water mark reading.
    pub fn set_stack_high_water_mark(&self, bytes: Option<u32>) {
        self.state.lock().stack_high_water_mark = bytes;
    }

    /// Number of times `restart` was called.
    #[must_use]
    pub fn restart_count(&self) -> u32 {
        self.restart_count.load(Ordering::Acquire)
    }

    /// Whether peripherals are powered down.
    #[must_use]
    pub fn peripheral_power_down(&self) -> bool {
        self.state.lock().peripheral_power_down
    }

    /// Whether radio power-save is enabled.
    #[must_use]
    pub fn radio_power_save(&self) -> bool {
        self.state.lock().radio_power_save
    }

    /// Total milliseconds spent in requested light sleep.
    #[must_use]
    pub fn slept_ms(&self) -> u64 {
        self.state.lock().slept_ms
    }

    /// The simulated watchdog peripheral, if installed.
    #[must_use]
    pub fn simulated_watchdog(&self) -> Option<&SimulatedWatchdogPeripheral> {
        self.watchdog.as_ref()
    }
}

impl Default for HostPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for HostPlatform {
    fn free_heap(&self) -> u32 {
        self.state.lock().free_heap
    }

    fn total_heap(&self) -> u32 {
        self.state.lock().total_heap
    }

    fn largest_free_block(&self) -> Option<u32> {
        self.state.lock().largest_free_block
    }

    fn stack_high_water_mark(&self) -> Option<u32> {
        self.state.lock().stack_high_water_mark
    }

    fn chip_id(&self) -> u64 {
        self.chip_id
    }

    fn platform_name(&self) -> &str {
        &self.name
    }

    fn cpu_frequency_mhz(&self) -> u32 {
        self.state.lock().cpu_frequency_mhz
    }

    fn restart(&self) {
        let count = self.restart_count.fetch_add(1, Ordering::AcqRel);
        tracing::warn!(platform = %self.name, restarts = count.saturating_add(1), "restart requested");
    }

    fn watchdog_peripheral(&self) -> Option<&dyn WatchdogPeripheral> {
        self.watchdog
            .as_ref()
            .map(|w| w as &dyn WatchdogPeripheral)
    }
}

impl PowerControl for HostPlatform {
    fn set_cpu_frequency_mhz(&self, mhz: u32) -> PlatformResult<()> {
        if mhz == 0 {
            return Err(PlatformError::power_control("frequency must be non-zero"));
        }
        self.state.lock().cpu_frequency_mhz = mhz;
        Ok(())
    }

    fn set_peripheral_power_down(&self, enabled: bool) {
        self.state.lock().peripheral_power_down = enabled;
    }

    fn set_radio_power_save(&self, enabled: bool) {
        self.state.lock().radio_power_save = enabled;
    }

    fn light_sleep(&self, duration_ms: u32) {
        let mut state = self.state.lock();
        state.slept_ms = state.slept_ms.saturating_add(u64::from(duration_ms));
    }
}

/// Builder for [`HostPlatform`].
#[derive(Debug)]
pub struct HostPlatformBuilder {
    name: String,
    chip_id: u64,
    state: HostState,
    with_watchdog: bool,
}

impl Default for HostPlatformBuilder {
    fn default() -> Self {
        Self {
            name: "host".to_string(),
            chip_id: 0x00C0_FFEE,
            state: HostState {
                free_heap: 200 * 1024,
                total_heap: 320 * 1024,
                largest_free_block: None,
                stack_high_water_mark: None,
                cpu_frequency_mhz: 240,
                peripheral_power_down: false,
                radio_power_save: false,
                slept_ms: 0,
            },
            with_watchdog: true,
        }
    }
}

impl HostPlatformBuilder {
    /// Set the platform name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the chip identifier.
    #[must_use]
    pub fn chip_id(mut self, id: u64) -> Self {
        self.chip_id = id;
        self
    }

    /// Set the total heap size.
    #[must_use]
    pub fn total_heap(mut self, bytes: u32) -> Self {
        self.state.total_heap = bytes;
        self
    }

    /// Set the initial free heap.
    #[must_use]
    pub fn free_heap(mut self, bytes: u32) -> Self {
        self.state.free_heap = bytes;
        self
    }

    /// Set the initial largest free block.
    #[must_use]
    pub fn largest_free_block(mut self, bytes: u32) -> Self {
        self.state.largest_free_block = Some(bytes);
        self
    }

    /// Set the initial stack high-water mark.
    #[must_use]
    pub fn stack_high_water_mark(mut self, bytes: u32) -> Self {
        self.state.stack_high_water_mark = Some(bytes);
        self
    }

    /// Install or omit the simulated hardware watchdog.
    #[must_use]
    pub fn with_watchdog(mut self, present: bool) -> Self {
        self.with_watchdog = present;
        self
    }

    /// Build the platform.
    #[must_use]
    pub fn build(self) -> HostPlatform {
        let mut state = self.state;
        state.free_heap = state.free_heap.min(state.total_heap);
        HostPlatform {
            name: self.name,
            chip_id: self.chip_id,
            state: Mutex::new(state),
            restart_count: AtomicU32::new(0),
            watchdog: self.with_watchdog.then(SimulatedWatchdogPeripheral::new),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_heap_clamped_to_total() {
        let platform = HostPlatform::builder()
            .total_heap(1000)
            .free_heap(5000)
            .build();
        assert_eq!(platform.free_heap(), 1000);
        platform.set_free_heap(2000);
        assert_eq!(platform.free_heap(), 1000);
    }

    #[test]
    fn test_restart_is_recorded() {
        let platform = HostPlatform::new();
        platform.restart();
        platform.restart();
        assert_eq!(platform.restart_count(), 2);
    }

    #[test]
    fn test_watchdog_peripheral_presence() {
        assert!(HostPlatform::new().watchdog_peripheral().is_some());
        let bare = HostPlatform::builder().with_watchdog(false).build();
        assert!(bare.watchdog_peripheral().is_none());
    }

    #[test]
    fn test_peripheral_rejects_zero_timeout() {
        let wdt = SimulatedWatchdogPeripheral::new();
        assert!(wdt.configure(0).is_err());
        assert!(!wdt.is_enabled());
        assert!(wdt.configure(5000).is_ok());
        assert!(wdt.is_enabled());
        assert_eq!(wdt.timeout_ms(), 5000);
    }

    #[test]
    fn test_power_knobs_recorded() -> Result<(), PlatformError> {
        let platform = HostPlatform::new();
        platform.set_cpu_frequency_mhz(80)?;
        platform.set_peripheral_power_down(true);
        platform.set_radio_power_save(true);
        platform.light_sleep(250);
        assert_eq!(platform.cpu_frequency_mhz(), 80);
        assert!(platform.peripheral_power_down());
        assert!(platform.radio_power_save());
        assert_eq!(platform.slept_ms(), 250);
        Ok(())
    }
}
