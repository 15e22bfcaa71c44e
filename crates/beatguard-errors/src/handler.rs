//! Fault handling and the handler-level fail-safe latch.

use crate::code::{ErrorCode, ErrorSeverity, RecoveryStrategy};
use crate::context::ErrorContext;
use crate::recovery::{RecoveryAction, RecoveryFn};
use beatguard_platform::{LogLevel, Logger};
use std::collections::HashMap;

/// Errors accumulated at or above this count keep the handler latched.
pub const ERROR_COUNT_CEILING: u32 = 10;

const COMPONENT: &str = "ErrorHandler";

/// Consumer of fault reports.
pub trait ErrorHandler {
    /// Log and count a fault. Returns `false` when the fault latched
    /// fail-safe mode.
    fn handle_error(&mut self, ctx: ErrorContext) -> bool;

    /// Recovery policy for `code`. Pure lookup.
    fn recovery_action(&self, code: ErrorCode) -> RecoveryAction;

    /// Recovery policy for a concrete report; FATAL always prescribes a
    /// restart.
    fn recovery_action_for(&self, ctx: &ErrorContext) -> RecoveryAction {
        if ctx.severity == ErrorSeverity::Fatal {
            let mut action = self.recovery_action(ctx.code);
            action.strategy = RecoveryStrategy::SystemReset;
            action
        } else {
            self.recovery_action(ctx.code)
        }
    }

    /// Whether the handler's latch is set.
    fn is_in_fail_safe_mode(&self) -> bool;

    /// Try to clear the latch. Returns `true` when not latched afterwards.
    fn attempt_recovery(&mut self) -> bool;

    /// Faults handled since start-up or the last successful recovery.
    fn error_count(&self) -> u32;
}

/// Handler that logs through a [`Logger`] and latches on CRITICAL or FATAL.
pub struct DefaultErrorHandler<'a> {
    logger: &'a dyn Logger,
    in_fail_safe_mode: bool,
    error_count: u32,
    last_error_time_ms: Option<u64>,
    recovery_fns: HashMap<ErrorCode, RecoveryFn>,
}

impl<'a> DefaultErrorHandler<'a> {
    /// Create an unlatched handler.
    #[must_use]
    pub fn new(logger: &'a dyn Logger) -> Self {
        Self {
            logger,
            in_fail_safe_mode: false,
            error_count: 0,
            last_error_time_ms: None,
            recovery_fns: HashMap::new(),
        }
    }

    /// Attach a routine returned with every lookup for `code`.
    pub fn set_recovery_fn(&mut self, code: ErrorCode, f: RecoveryFn) {
        self.recovery_fns.insert(code, f);
    }

    /// Timestamp of the most recent fault.
    #[must_use]
    pub fn last_error_time_ms(&self) -> Option<u64> {
        self.last_error_time_ms
    }

    fn log_level_for(severity: ErrorSeverity) -> LogLevel {
        match severity {
            ErrorSeverity::Debug => LogLevel::Debug,
            ErrorSeverity::Info => LogLevel::Info,
            ErrorSeverity::Warning => LogLevel::Warning,
            ErrorSeverity::Error | ErrorSeverity::Critical => LogLevel::Error,
            ErrorSeverity::Fatal => LogLevel::Critical,
        }
    }

    fn enter_fail_safe_mode(&mut self, ctx: &ErrorContext) {
        if !self.in_fail_safe_mode {
            self.logger.critical(COMPONENT, "Entering fail-safe mode");
            tracing::warn!(code = ctx.code.as_str(), "error handler latched fail-safe mode");
        }
        self.in_fail_safe_mode = true;
    }
}

impl ErrorHandler for DefaultErrorHandler<'_> {
    fn handle_error(&mut self, ctx: ErrorContext) -> bool {
        let line = ctx.to_string();
        self.logger
            .log(Self::log_level_for(ctx.severity), COMPONENT, &line);

        self.error_count = self.error_count.saturating_add(1);
        self.last_error_time_ms = Some(ctx.timestamp_ms);

        if ctx.is_critical() {
            self.enter_fail_safe_mode(&ctx);
            return false;
        }
        true
    }

    fn recovery_action(&self, code: ErrorCode) -> RecoveryAction {
        let action = RecoveryAction::for_code(code);
        match self.recovery_fns.get(&code) {
            Some(f) => action.with_recovery_fn(f.clone()),
            None => action,
        }
    }

    fn is_in_fail_safe_mode(&self) -> bool {
        self.in_fail_safe_mode
    }

    fn attempt_recovery(&mut self) -> bool {
        if !self.in_fail_safe_mode {
            return true;
        }
        if self.error_count < ERROR_COUNT_CEILING {
            self.in_fail_safe_mode = false;
            self.error_count = 0;
            self.logger
                .info(COMPONENT, "Recovered from fail-safe mode");
            return true;
        }
        self.logger.error(
            COMPONENT,
            "Cannot recover from fail-safe mode: too many errors",
        );
        false
    }

    fn error_count(&self) -> u32 {
        self.error_count
    }
}

impl core::fmt::Debug for DefaultErrorHandler<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DefaultErrorHandler")
            .field("in_fail_safe_mode", &self.in_fail_safe_mode)
            .field("error_count", &self.error_count)
            .field("last_error_time_ms", &self.last_error_time_ms)
            .field("recovery_fns", &self.recovery_fns.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beatguard_test_helpers::RecordingLogger;
    use std::sync::Arc;

    fn report(code: ErrorCode, severity: ErrorSeverity) -> ErrorContext {
        ErrorContext::new(code, severity, "test", 1)
    }

    #[test]
    fn test_non_critical_returns_true() {
        let logger = RecordingLogger::new();
        let mut handler = DefaultErrorHandler::new(&logger);
        assert!(handler.handle_error(report(ErrorCode::Timeout, ErrorSeverity::Warning)));
        assert!(!handler.is_in_fail_safe_mode());
        assert_eq!(handler.error_count(), 1);
        assert_eq!(handler.last_error_time_ms(), Some(1));
    }

    #[test]
    fn test_critical_latches() {
        let logger = RecordingLogger::new();
        let mut handler = DefaultErrorHandler::new(&logger);
        assert!(!handler.handle_error(report(ErrorCode::StackOverflow, ErrorSeverity::Critical)));
        assert!(handler.is_in_fail_safe_mode());
    }

    #[test]
    fn test_log_level_mapping() {
        let logger = RecordingLogger::new();
        let mut handler = DefaultErrorHandler::new(&logger);
        handler.handle_error(report(ErrorCode::Unknown, ErrorSeverity::Info));
        handler.handle_error(report(ErrorCode::Unknown, ErrorSeverity::Error));
        handler.handle_error(report(ErrorCode::Unknown, ErrorSeverity::Critical));
        handler.handle_error(report(ErrorCode::Unknown, ErrorSeverity::Fatal));

        let levels: Vec<LogLevel> = logger
            .entries()
            .into_iter()
            .filter(|e| e.message.starts_with("Error ["))
            .map(|e| e.level)
            .collect();
        assert_eq!(
            levels,
            vec![
                LogLevel::Info,
                LogLevel::Error,
                LogLevel::Error,
                LogLevel::Critical
            ]
        );
    }

    #[test]
    fn test_recovery_below_ceiling() {
        let logger = RecordingLogger::new();
        let mut handler = DefaultErrorHandler::new(&logger);
        handler.handle_error(report(ErrorCode::HeapCorruption, ErrorSeverity::Critical));
        assert!(handler.attempt_recovery());
        assert!(!handler.is_in_fail_safe_mode());
        assert_eq!(handler.error_count(), 0);
    }

    #[test]
    fn test_recovery_refused_at_ceiling_without_mutation() {
        let logger = RecordingLogger::new();
        let mut handler = DefaultErrorHandler::new(&logger);
        for _ in 0..ERROR_COUNT_CEILING {
            handler.handle_error(report(ErrorCode::Unknown, ErrorSeverity::Critical));
        }
        for _ in 0..3 {
            assert!(!handler.attempt_recovery());
            assert!(handler.is_in_fail_safe_mode());
            assert_eq!(handler.error_count(), ERROR_COUNT_CEILING);
        }
    }

    #[test]
    fn test_registered_recovery_fn_is_returned() {
        let logger = RecordingLogger::new();
        let mut handler = DefaultErrorHandler::new(&logger);
        handler.set_recovery_fn(ErrorCode::SignalInitFailed, Arc::new(|| true));
        assert!(handler
            .recovery_action(ErrorCode::SignalInitFailed)
            .recovery_fn
            .is_some());
        assert!(handler.recovery_action(ErrorCode::Timeout).recovery_fn.is_none());
    }

    #[test]
    fn test_fatal_lookup_keeps_routine() {
        let logger = RecordingLogger::new();
        let mut handler = DefaultErrorHandler::new(&logger);
        handler.set_recovery_fn(ErrorCode::Timeout, Arc::new(|| true));
        let action = handler.recovery_action_for(&report(ErrorCode::Timeout, ErrorSeverity::Fatal));
        assert_eq!(action.strategy, RecoveryStrategy::SystemReset);
        assert!(action.recovery_fn.is_some());
    }
}
