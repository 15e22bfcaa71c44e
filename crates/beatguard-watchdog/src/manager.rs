//! Health-gated watchdog feeding and the manager-level fail-safe latch.

use crate::device::{Watchdog, WatchdogDevice};
use crate::state::{WatchdogKind, WatchdogMetrics, WatchdogState};
use beatguard_memory::MemoryMonitor;
use beatguard_platform::Logger;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default watchdog timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u32 = 30_000;

/// Failed health checks in a row that latch fail-safe mode.
pub const MAX_CONSECUTIVE_FAILURES: u32 = 3;

/// Zero-argument health predicate supplied by the surrounding firmware.
pub type HealthCheckFn = Arc<dyn Fn() -> bool + Send + Sync>;

const COMPONENT: &str = "WatchdogManager";

/// Snapshot of the manager's view of the watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchdogStatus {
    /// Whether the countdown is armed.
    pub is_active: bool,
    /// Milliseconds until expiry.
    pub time_remaining_ms: u32,
    /// Result of the most recent health check.
    pub last_health_check_passed: bool,
    /// Failed health checks since the last feed.
    pub consecutive_failures: u32,
    /// Whether the manager's latch is set.
    pub in_fail_safe_mode: bool,
    /// Device backing the watchdog.
    pub kind: WatchdogKind,
    /// Device lifecycle state.
    pub state: WatchdogState,
}

/// Sole owner of the watchdog device.
///
/// Feeding is gated on health: [`check_health_and_feed`] feeds only when the
/// registered callback and the low-memory check both pass. After
/// [`MAX_CONSECUTIVE_FAILURES`] failures in a row the manager latches fail-safe
/// mode and keeps the device fed so the firmware degrades instead of being
/// reset. The latch only clears through [`attempt_recovery`].
///
/// Dropping the manager feeds the device one last time.
///
/// [`check_health_and_feed`]: WatchdogManager::check_health_and_feed
/// [`attempt_recovery`]: WatchdogManager::attempt_recovery
pub struct WatchdogManager<'a> {
    device: WatchdogDevice<'a>,
    memory: &'a MemoryMonitor<'a>,
    logger: &'a dyn Logger,
    health_check: Option<HealthCheckFn>,
    max_consecutive_failures: u32,
    consecutive_failures: u32,
    in_fail_safe_mode: bool,
    last_health_check_passed: bool,
    metrics: WatchdogMetrics,
}

impl<'a> WatchdogManager<'a> {
    /// Take ownership of an armed device.
    #[must_use]
    pub fn new(
        device: WatchdogDevice<'a>,
        memory: &'a MemoryMonitor<'a>,
        logger: &'a dyn Logger,
    ) -> Self {
        logger.info(
            COMPONENT,
            &format!("Managing {} watchdog", device.kind().as_str()),
        );
        Self {
            device,
            memory,
            logger,
            health_check: None,
            max_consecutive_failures: MAX_CONSECUTIVE_FAILURES,
            consecutive_failures: 0,
            in_fail_safe_mode: false,
            last_health_check_passed: true,
            metrics: WatchdogMetrics::default(),
        }
    }

    /// Override the escalation threshold (minimum 1).
    #[must_use]
    pub fn with_max_consecutive_failures(mut self, max: u32) -> Self {
        self.max_consecutive_failures = max.max(1);
        self
    }

    /// Register the custom health predicate, replacing any previous one.
    pub fn register_health_check(&mut self, check: HealthCheckFn) {
        self.health_check = Some(check);
    }

    /// Feed the device and clear the failure counter.
    pub fn feed(&mut self) {
        self.feed_device();
        self.consecutive_failures = 0;
    }

    /// Run the health checks; feed only if all pass.
    ///
    /// Returns whether the checks passed.
    pub fn check_health_and_feed(&mut self) -> bool {
        let custom_ok = self.health_check.as_ref().is_none_or(|check| check());
        let memory_ok = !self.memory.is_low_memory();
        let healthy = custom_ok && memory_ok;
        self.last_health_check_passed = healthy;

        if healthy {
            self.feed();
            return true;
        }

        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.metrics.record_failed_check();
        self.logger.warning(
            COMPONENT,
            &format!(
                "Health check failed (custom={custom_ok}, memory={memory_ok}), consecutive failures: {}",
                self.consecutive_failures
            ),
        );

        if self.consecutive_failures >= self.max_consecutive_failures {
            self.enter_fail_safe_mode();
        }
        false
    }

    /// Latch fail-safe mode. The device is still fed; the failure counter is
    /// left as is.
    pub fn enter_fail_safe_mode(&mut self) {
        if !self.in_fail_safe_mode {
            self.in_fail_safe_mode = true;
            self.metrics.record_fail_safe_entry();
            self.logger
                .critical(COMPONENT, "Entering fail-safe mode");
            tracing::warn!(
                consecutive_failures = self.consecutive_failures,
                "watchdog manager latched fail-safe mode"
            );
        }
        self.feed_device();
    }

    /// Clear the latch if memory is healthy and no health check has failed
    /// since the last feed. Refusals change nothing.
    ///
    /// Returns `true` if the manager is out of fail-safe mode afterwards.
    pub fn attempt_recovery(&mut self) -> bool {
        if !self.in_fail_safe_mode {
            return true;
        }
        if self.memory.is_low_memory() || self.consecutive_failures > 0 {
            self.logger.warning(
                COMPONENT,
                "Recovery refused: system not healthy",
            );
            return false;
        }
        self.in_fail_safe_mode = false;
        self.consecutive_failures = 0;
        self.metrics.record_recovery();
        self.logger
            .info(COMPONENT, "Recovered from fail-safe mode");
        true
    }

    /// Whether the latch is set.
    #[must_use]
    pub fn is_in_fail_safe_mode(&self) -> bool {
        self.in_fail_safe_mode
    }

    /// Failed health checks since the last feed.
    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Escalation threshold.
    #[must_use]
    pub fn max_consecutive_failures(&self) -> u32 {
        self.max_consecutive_failures
    }

    /// Let a software device detect starvation. Returns `true` if a reset was
    /// forced.
    pub fn poll(&mut self) -> bool {
        self.device.poll()
    }

    /// Snapshot for status reporting.
    #[must_use]
    pub fn status(&self) -> WatchdogStatus {
        WatchdogStatus {
            is_active: self.device.is_active(),
            time_remaining_ms: self.device.time_remaining_ms(),
            last_health_check_passed: self.last_health_check_passed,
            consecutive_failures: self.consecutive_failures,
            in_fail_safe_mode: self.in_fail_safe_mode,
            kind: self.device.kind(),
            state: self.device.state(),
        }
    }

    /// Counters.
    #[must_use]
    pub fn metrics(&self) -> WatchdogMetrics {
        self.metrics
    }

    /// The owned device.
    #[must_use]
    pub fn device(&self) -> &WatchdogDevice<'a> {
        &self.device
    }

    fn feed_device(&mut self) {
        match self.device.feed() {
            Ok(()) => self.metrics.record_feed(),
            Err(error) => {
                tracing::debug!(%error, "watchdog feed ignored");
            }
        }
    }
}

impl Drop for WatchdogManager<'_> {
    fn drop(&mut self) {
        self.feed_device();
    }
}

impl core::fmt::Debug for WatchdogManager<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WatchdogManager")
            .field("device", &self.device)
            .field("has_health_check", &self.health_check.is_some())
            .field("consecutive_failures", &self.consecutive_failures)
            .field("in_fail_safe_mode", &self.in_fail_safe_mode)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}
