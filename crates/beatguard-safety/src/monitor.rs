//! Cross-task fault reporting and the published safety state.

use beatguard_errors::{ErrorCode, ErrorContext, ErrorSeverity};
use crossbeam::channel::{Sender, TrySendError};
use portable_atomic::{AtomicBool, AtomicU8, AtomicU16, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

/// Reports buffered between two safety ticks.
pub const REPORT_QUEUE_CAPACITY: usize = 32;

/// Safety state published by the manager after every tick and report.
///
/// Any task may read it; only the safety manager writes it.
#[derive(Debug, Default)]
pub struct SafetyMonitor {
    fail_safe: AtomicBool,
    error_count: AtomicU32,
    dropped_reports: AtomicU32,
    last_tick_ms: AtomicU64,
    ticks: AtomicU64,
    pending_critical: AtomicBool,
    pending_code: AtomicU16,
    pending_severity: AtomicU8,
}

impl SafetyMonitor {
    /// Whether either fail-safe latch was set at the last publication.
    #[must_use]
    pub fn is_in_fail_safe_mode(&self) -> bool {
        self.fail_safe.load(Ordering::Acquire)
    }

    /// Handler error count at the last publication.
    #[must_use]
    pub fn error_count(&self) -> u32 {
        self.error_count.load(Ordering::Acquire)
    }

    /// Reports lost because the queue was full or the manager was gone.
    #[must_use]
    pub fn dropped_reports(&self) -> u32 {
        self.dropped_reports.load(Ordering::Acquire)
    }

    /// Clock reading at the start of the last tick.
    #[must_use]
    pub fn last_tick_ms(&self) -> u64 {
        self.last_tick_ms.load(Ordering::Acquire)
    }

    /// Completed safety ticks.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    pub(crate) fn publish(&self, fail_safe: bool, error_count: u32) {
        self.fail_safe.store(fail_safe, Ordering::Release);
        self.error_count.store(error_count, Ordering::Release);
    }

    pub(crate) fn record_tick(&self, now_ms: u64) {
        self.last_tick_ms.store(now_ms, Ordering::Release);
        self.ticks.fetch_add(1, Ordering::AcqRel);
    }

    fn record_dropped(&self) {
        self.dropped_reports.fetch_add(1, Ordering::AcqRel);
    }

    /// Whether a latching report is waiting outside the queue.
    #[must_use]
    pub fn has_pending_critical(&self) -> bool {
        self.pending_critical.load(Ordering::Acquire)
    }

    /// Park a latching report that did not fit in the queue.
    ///
    /// Only one is kept; a later one overwrites the code of an earlier one
    /// that has not been taken yet. Either way the next tick latches.
    fn record_pending_critical(&self, ctx: &ErrorContext) {
        self.pending_code.store(ctx.code.code(), Ordering::Relaxed);
        self.pending_severity.store(ctx.severity as u8, Ordering::Relaxed);
        self.pending_critical.store(true, Ordering::Release);
    }

    pub(crate) fn take_pending_critical(&self) -> Option<(ErrorCode, ErrorSeverity)> {
        if !self.pending_critical.swap(false, Ordering::AcqRel) {
            return None;
        }
        let code = ErrorCode::from_code(self.pending_code.load(Ordering::Relaxed))
            .unwrap_or(ErrorCode::Unknown);
        let fatal = self.pending_severity.load(Ordering::Relaxed) == ErrorSeverity::Fatal as u8;
        let severity = if fatal { ErrorSeverity::Fatal } else { ErrorSeverity::Critical };
        Some((code, severity))
    }
}

/// Cloneable handle for reporting faults from other tasks.
///
/// Reports are queued and handled at the start of the next safety tick.
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    sender: Sender<ErrorContext>,
    monitor: Arc<SafetyMonitor>,
}

impl ErrorReporter {
    pub(crate) fn new(sender: Sender<ErrorContext>, monitor: Arc<SafetyMonitor>) -> Self {
        Self { sender, monitor }
    }

    /// Queue a prepared report.
    ///
    /// Returns `false` and counts the report as dropped if the queue is full
    /// or the safety manager no longer exists. Never blocks.
    ///
    /// Critical and fatal reports are never dropped for a full queue: they
    /// are parked on the monitor and latch fail-safe mode on the next tick.
    pub fn report(&self, ctx: ErrorContext) -> bool {
        match self.sender.try_send(ctx) {
            Ok(()) => true,
            Err(TrySendError::Full(ctx)) if ctx.is_critical() => {
                self.monitor.record_pending_critical(&ctx);
                tracing::warn!(code = %ctx.code, "error report queue full, parking critical report");
                true
            }
            Err(TrySendError::Full(ctx)) => {
                self.monitor.record_dropped();
                tracing::warn!(code = %ctx.code, "error report queue full, dropping report");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                self.monitor.record_dropped();
                false
            }
        }
    }

    /// Queue a report stamped with the last safety tick time.
    #[track_caller]
    pub fn report_error(&self, code: ErrorCode, severity: ErrorSeverity, message: &str) -> bool {
        let ctx = ErrorContext::new(code, severity, message, self.monitor.last_tick_ms());
        self.report(ctx)
    }

    /// Shared safety state.
    #[must_use]
    pub fn monitor(&self) -> &SafetyMonitor {
        &self.monitor
    }
}
