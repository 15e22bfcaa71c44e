//! The root safety manager.

use crate::config::SafetyConfig;
use crate::error::SafetyResult;
use crate::monitor::{ErrorReporter, REPORT_QUEUE_CAPACITY, SafetyMonitor};
use beatguard_errors::{DefaultErrorHandler, ErrorCode, ErrorContext, ErrorHandler, ErrorSeverity};
use beatguard_memory::{MemoryMonitor, StackGuard};
use beatguard_platform::{Logger, Platform, Timer};
use beatguard_watchdog::{
    CriticalSectionGuard, HealthCheckFn, WatchdogFactory, WatchdogManager, WatchdogStatus,
};
use crossbeam::channel::{Receiver, Sender, bounded};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const COMPONENT: &str = "SafetyManager";

/// Heap usage above which the memory check warns, in percent.
pub const HIGH_HEAP_USAGE_PERCENT: u64 = 90;

/// Fragmentation ratio above which the memory check warns.
pub const HIGH_FRAGMENTATION_RATIO: f32 = 0.5;

/// Snapshot of the whole safety subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyStatus {
    /// Whether a watchdog device is armed.
    pub watchdog_active: bool,
    /// Free heap above the low-memory threshold.
    pub memory_ok: bool,
    /// Stack headroom above the margin.
    pub stack_ok: bool,
    /// Either latch set.
    pub in_fail_safe_mode: bool,
    /// Reports handled since the last handler recovery.
    pub error_count: u32,
    /// Free heap in bytes.
    pub free_heap: u32,
    /// `1 - largest_free_block / free_heap`.
    pub fragmentation_ratio: f32,
    /// Watchdog manager view, absent when running without a watchdog.
    pub watchdog_status: Option<WatchdogStatus>,
}

/// Root of the safety subsystem.
///
/// Owns the error handler and the watchdog manager and is driven by one
/// periodic caller through [`execute_safety_checks`]. Other tasks report
/// faults through an [`ErrorReporter`] and read state through the shared
/// [`SafetyMonitor`].
///
/// # Fail-safe latches
///
/// Two latches exist. The error handler latches on any CRITICAL or FATAL
/// report and clears only while its error count stays below the ceiling.
/// The manager's own latch is set by the same reports (unless
/// `enable_fail_safe_mode` is off) and by watchdog escalation, and clears
/// only through [`attempt_recovery`], which also needs the handler and the
/// watchdog manager to agree and a fresh health check to pass.
/// [`is_in_fail_safe_mode`] is true while either latch is set.
///
/// [`execute_safety_checks`]: SafetyManager::execute_safety_checks
/// [`attempt_recovery`]: SafetyManager::attempt_recovery
/// [`is_in_fail_safe_mode`]: SafetyManager::is_in_fail_safe_mode
pub struct SafetyManager<'a> {
    config: SafetyConfig,
    timer: &'a dyn Timer,
    logger: &'a dyn Logger,
    memory: &'a MemoryMonitor<'a>,
    stack: StackGuard<'a>,
    error_handler: DefaultErrorHandler<'a>,
    watchdog: Option<WatchdogManager<'a>>,
    health_check: Option<HealthCheckFn>,
    last_health_check_ms: u64,
    last_memory_check_ms: u64,
    fail_safe_mode: bool,
    reports: Receiver<ErrorContext>,
    reporter: Sender<ErrorContext>,
    monitor: Arc<SafetyMonitor>,
}

impl<'a> SafetyManager<'a> {
    /// Build the error handler and, best-effort, the watchdog.
    ///
    /// Hardware is preferred; without a usable peripheral the software
    /// fallback is used. If neither can be armed the manager runs without a
    /// watchdog and reports a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(
        platform: &'a dyn Platform,
        timer: &'a dyn Timer,
        logger: &'a dyn Logger,
        memory: &'a MemoryMonitor<'a>,
        config: SafetyConfig,
    ) -> SafetyResult<Self> {
        config.validate()?;
        let (reporter, reports) = bounded(REPORT_QUEUE_CAPACITY);
        let now = timer.millis();

        let mut manager = Self {
            config,
            timer,
            logger,
            memory,
            stack: StackGuard::new(platform),
            error_handler: DefaultErrorHandler::new(logger),
            watchdog: None,
            health_check: None,
            last_health_check_ms: now,
            last_memory_check_ms: now,
            fail_safe_mode: false,
            reports,
            reporter,
            monitor: Arc::new(SafetyMonitor::default()),
        };

        match WatchdogFactory::create(platform, timer, config.watchdog_timeout_ms) {
            Ok(device) => {
                manager.watchdog = Some(
                    WatchdogManager::new(device, memory, logger)
                        .with_max_consecutive_failures(config.max_consecutive_failures),
                );
            }
            Err(error) => {
                tracing::warn!(%error, "watchdog unavailable");
                manager.report_error(
                    ErrorCode::Unknown,
                    ErrorSeverity::Warning,
                    "Watchdog initialization failed - continuing without watchdog protection",
                );
            }
        }

        manager.publish();
        logger.info(COMPONENT, "Safety manager initialized");
        Ok(manager)
    }

    /// Configuration in effect.
    #[must_use]
    pub fn config(&self) -> &SafetyConfig {
        &self.config
    }

    /// Steady-tick entry point.
    ///
    /// Handles queued reports, runs the health and memory checks that are
    /// due, and feeds the watchdog through its health gate only if every
    /// check run this tick passed. Returns whether they all passed.
    pub fn execute_safety_checks(&mut self) -> bool {
        self.drain_reports();

        let now = self.timer.millis();
        let mut all_passed = true;

        if now.saturating_sub(self.last_health_check_ms) >= self.config.health_check_interval_ms {
            all_passed &= self.perform_health_check();
            self.last_health_check_ms = now;
        }

        if self.config.enable_memory_monitoring
            && now.saturating_sub(self.last_memory_check_ms) >= self.config.memory_check_interval_ms
        {
            all_passed &= self.perform_memory_checks();
            self.last_memory_check_ms = now;
        }

        if all_passed {
            self.feed_through_health_gate();
        }
        if let Some(watchdog) = self.watchdog.as_mut() {
            watchdog.poll();
        }

        self.record_tick(now);
        all_passed
    }

    /// Report a fault at the caller's location.
    ///
    /// Returns the handler's verdict: `false` for reports that latch
    /// fail-safe mode.
    #[track_caller]
    pub fn report_error(&mut self, code: ErrorCode, severity: ErrorSeverity, message: &str) -> bool {
        let ctx = ErrorContext::new(code, severity, message, self.timer.millis());
        self.handle_report(ctx)
    }

    /// Whether either fail-safe latch is set.
    #[must_use]
    pub fn is_in_fail_safe_mode(&self) -> bool {
        self.fail_safe_mode || self.error_handler.is_in_fail_safe_mode()
    }

    /// Leave fail-safe mode if the handler and the watchdog manager allow it
    /// and a fresh health check passes.
    ///
    /// Returns `true` if the system is out of fail-safe mode afterwards.
    pub fn attempt_recovery(&mut self) -> bool {
        if !self.is_in_fail_safe_mode() {
            return true;
        }
        if !self.error_handler.attempt_recovery() {
            self.publish();
            return false;
        }
        if let Some(watchdog) = self.watchdog.as_mut()
            && !watchdog.attempt_recovery()
        {
            self.publish();
            return false;
        }
        if !self.perform_health_check() {
            self.publish();
            return false;
        }

        self.fail_safe_mode = false;
        self.logger
            .info(COMPONENT, "Safety manager recovery successful");
        self.publish();
        !self.is_in_fail_safe_mode()
    }

    /// Snapshot of the whole subsystem.
    #[must_use]
    pub fn safety_status(&self) -> SafetyStatus {
        SafetyStatus {
            watchdog_active: self.watchdog.as_ref().is_some_and(|w| w.status().is_active),
            memory_ok: !self.memory.is_low_memory(),
            stack_ok: !self.stack.is_stack_overflow_risk(),
            in_fail_safe_mode: self.is_in_fail_safe_mode(),
            error_count: self.error_handler.error_count(),
            free_heap: self.memory.free_heap(),
            fragmentation_ratio: self.memory.fragmentation(),
            watchdog_status: self.watchdog.as_ref().map(WatchdogManager::status),
        }
    }

    /// Register the custom health predicate with this manager and the
    /// watchdog manager.
    pub fn register_health_check(&mut self, check: HealthCheckFn) {
        if let Some(watchdog) = self.watchdog.as_mut() {
            watchdog.register_health_check(Arc::clone(&check));
        }
        self.health_check = Some(check);
    }

    /// Feed the watchdog unconditionally.
    pub fn feed_watchdog(&mut self) {
        if let Some(watchdog) = self.watchdog.as_mut() {
            watchdog.feed();
        }
    }

    /// Guard that feeds the watchdog now and again when dropped.
    ///
    /// `None` when running without a watchdog.
    #[must_use]
    pub fn critical_section(&mut self) -> Option<CriticalSectionGuard<'_, 'a>> {
        self.watchdog.as_mut().map(CriticalSectionGuard::new)
    }

    /// Handle for reporting from other tasks.
    #[must_use]
    pub fn reporter(&self) -> ErrorReporter {
        ErrorReporter::new(self.reporter.clone(), Arc::clone(&self.monitor))
    }

    /// Shared published state.
    #[must_use]
    pub fn monitor(&self) -> Arc<SafetyMonitor> {
        Arc::clone(&self.monitor)
    }

    /// The owned error handler.
    #[must_use]
    pub fn error_handler(&self) -> &DefaultErrorHandler<'a> {
        &self.error_handler
    }

    /// Mutable access to the error handler, for registering recovery
    /// closures.
    pub fn error_handler_mut(&mut self) -> &mut DefaultErrorHandler<'a> {
        &mut self.error_handler
    }

    /// The owned watchdog manager, if any.
    #[must_use]
    pub fn watchdog_manager(&self) -> Option<&WatchdogManager<'a>> {
        self.watchdog.as_ref()
    }

    fn drain_reports(&mut self) {
        while let Ok(ctx) = self.reports.try_recv() {
            self.handle_report(ctx);
        }
        if let Some((code, severity)) = self.monitor.take_pending_critical() {
            let ctx = ErrorContext::new(
                code,
                severity,
                "Critical report arrived while the report queue was full",
                self.timer.millis(),
            )
            .without_location();
            self.handle_report(ctx);
        }
    }

    fn handle_report(&mut self, ctx: ErrorContext) -> bool {
        let latches = ctx.is_critical();
        let code = ctx.code;
        let handled = self.error_handler.handle_error(ctx);

        if latches && self.config.enable_fail_safe_mode && !self.fail_safe_mode {
            self.fail_safe_mode = true;
            tracing::warn!(%code, "safety manager latched fail-safe mode");
        }
        self.publish();
        handled
    }

    fn feed_through_health_gate(&mut self) {
        let Some(watchdog) = self.watchdog.as_mut() else {
            return;
        };
        let was_latched = watchdog.is_in_fail_safe_mode();
        watchdog.check_health_and_feed();
        if !was_latched && watchdog.is_in_fail_safe_mode() {
            self.report_error(
                ErrorCode::FailSafeMode,
                ErrorSeverity::Critical,
                "Watchdog health checks failing, entering fail-safe mode",
            );
        }
    }

    fn perform_health_check(&mut self) -> bool {
        let mut healthy = true;

        if self.config.enable_memory_monitoring && self.memory.is_low_memory() {
            self.report_error(
                ErrorCode::MemoryAllocationFailed,
                ErrorSeverity::Error,
                "Low memory condition detected",
            );
            healthy = false;
        }

        if self.config.enable_stack_monitoring && self.stack.is_stack_overflow_risk() {
            self.report_error(
                ErrorCode::StackOverflow,
                ErrorSeverity::Critical,
                "Stack overflow risk detected",
            );
            healthy = false;
        }

        let custom_ok = self.health_check.as_ref().is_none_or(|check| check());
        if !custom_ok {
            self.report_error(
                ErrorCode::HealthCheckFailed,
                ErrorSeverity::Error,
                "Custom health check failed",
            );
            healthy = false;
        }

        healthy
    }

    /// Usage and fragmentation only warn; the check itself always passes.
    fn perform_memory_checks(&mut self) -> bool {
        let free = u64::from(self.memory.free_heap());
        let total = u64::from(self.memory.total_heap());

        if total > 0 && free * 100 / total < 100 - HIGH_HEAP_USAGE_PERCENT {
            self.report_error(
                ErrorCode::MemoryAllocationFailed,
                ErrorSeverity::Warning,
                "High memory usage detected (>90% heap used)",
            );
        }

        if self.memory.fragmentation() > HIGH_FRAGMENTATION_RATIO {
            self.report_error(
                ErrorCode::HeapCorruption,
                ErrorSeverity::Warning,
                "High heap fragmentation detected",
            );
        }

        true
    }

    fn publish(&self) {
        self.monitor
            .publish(self.is_in_fail_safe_mode(), self.error_handler.error_count());
    }

    fn record_tick(&self, now: u64) {
        self.publish();
        self.monitor.record_tick(now);
    }
}

impl core::fmt::Debug for SafetyManager<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SafetyManager")
            .field("config", &self.config)
            .field("fail_safe_mode", &self.fail_safe_mode)
            .field("error_handler", &self.error_handler)
            .field("watchdog", &self.watchdog)
            .field("last_health_check_ms", &self.last_health_check_ms)
            .field("last_memory_check_ms", &self.last_memory_check_ms)
            .finish_non_exhaustive()
    }
}
