//! Scoped watchdog slack for bounded non-interruptible work.

use crate::manager::WatchdogManager;
use core::ops::{Deref, DerefMut};

/// Feeds the watchdog on construction and again when dropped.
///
/// The configured timeout is never changed; the guard only hands the caller a
/// full countdown on entry and another on every exit path, including early
/// returns and unwinding. Guards nest: build the inner guard from the outer
/// one, which dereferences to the manager.
///
/// ```rust
/// # use beatguard_watchdog::prelude::*;
/// # use beatguard_memory::MemoryMonitor;
/// # use beatguard_platform::{HostPlatform, ManualTimer, TracingLogger};
/// # fn main() -> Result<(), WatchdogError> {
/// # let platform = HostPlatform::new();
/// # let timer = ManualTimer::new();
/// # let logger = TracingLogger::new();
/// # let memory = MemoryMonitor::new(&platform);
/// let device = WatchdogFactory::create(&platform, &timer, 5_000)?;
/// let mut manager = WatchdogManager::new(device, &memory, &logger);
/// {
///     let mut outer = CriticalSectionGuard::new(&mut manager);
///     {
///         let _inner = CriticalSectionGuard::new(&mut outer);
///     }
///     outer.refresh();
/// }
/// # Ok(())
/// # }
/// ```
#[must_use = "the watchdog is fed again when the guard is dropped"]
pub struct CriticalSectionGuard<'g, 'a> {
    manager: &'g mut WatchdogManager<'a>,
}

impl<'g, 'a> CriticalSectionGuard<'g, 'a> {
    /// Feed the watchdog and open the section.
    pub fn new(manager: &'g mut WatchdogManager<'a>) -> Self {
        manager.feed();
        Self { manager }
    }

    /// Feed again without leaving the section.
    pub fn refresh(&mut self) {
        self.manager.feed();
    }
}

impl<'a> Deref for CriticalSectionGuard<'_, 'a> {
    type Target = WatchdogManager<'a>;

    fn deref(&self) -> &Self::Target {
        self.manager
    }
}

impl DerefMut for CriticalSectionGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.manager
    }
}

impl Drop for CriticalSectionGuard<'_, '_> {
    fn drop(&mut self) {
        self.manager.feed();
    }
}

impl core::fmt::Debug for CriticalSectionGuard<'_, '_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CriticalSectionGuard")
            .field("manager", &self.manager)
            .finish()
    }
}
