//! Platform, power and watchdog-peripheral interfaces.

use crate::error::PlatformResult;

/// A hardware countdown peripheral that restarts the device unless fed.
///
/// Methods take `&self`: the peripheral is a memory-mapped register block on
/// target, and implementations own whatever synchronisation they need.
pub trait WatchdogPeripheral: Send + Sync {
    /// Arm (or re-arm) the countdown with `timeout_ms`.
    ///
    /// # Errors
    ///
    /// Returns an error if the peripheral rejects the timeout.
    fn configure(&self, timeout_ms: u32) -> PlatformResult<()>;

    /// Reload the countdown.
    fn feed(&self);

    /// Whether the countdown is currently armed.
    fn is_enabled(&self) -> bool;
}

/// Heap/stack introspection and device identity.
pub trait Platform: Send + Sync {
    /// Bytes currently free on the heap.
    fn free_heap(&self) -> u32;

    /// Total heap size in bytes.
    fn total_heap(&self) -> u32;

    /// Largest contiguous free block, when the allocator can report it.
    fn largest_free_block(&self) -> Option<u32> {
        None
    }

    /// Minimum free stack bytes ever observed for the calling task, when the
    /// scheduler can report it.
    fn stack_high_water_mark(&self) -> Option<u32> {
        None
    }

    /// Unique device identifier.
    fn chip_id(&self) -> u64;

    /// Human-readable platform name.
    fn platform_name(&self) -> &str;

    /// Current CPU clock in MHz.
    fn cpu_frequency_mhz(&self) -> u32;

    /// Restart the device. On target this does not return.
    fn restart(&self);

    /// The hardware watchdog peripheral, if the platform has one.
    fn watchdog_peripheral(&self) -> Option<&dyn WatchdogPeripheral> {
        None
    }
}

/// Power knobs driven by the power manager.
pub trait PowerControl: Send + Sync {
    /// Set the CPU clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the frequency is not supported.
    fn set_cpu_frequency_mhz(&self, mhz: u32) -> PlatformResult<()>;

    /// Power peripherals down (or back up).
    fn set_peripheral_power_down(&self, enabled: bool);

    /// Enable or disable radio power-save.
    fn set_radio_power_save(&self, enabled: bool);

    /// Enter light sleep for `duration_ms`.
    fn light_sleep(&self, duration_ms: u32);
}
