//! Recovery policy per error code.

use crate::code::{ErrorCode, RecoveryStrategy};
use beatguard_platform::Timer;
use std::sync::Arc;

/// Owned recovery routine. Returns `true` when the fault is cleared.
pub type RecoveryFn = Arc<dyn Fn() -> bool + Send + Sync>;

/// Default retry budget for strategies that retry.
pub const DEFAULT_MAX_RETRIES: u8 = 3;

/// Default delay between retries in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u32 = 1000;

/// Policy for a fault: what to do, and how hard to try.
#[derive(Clone)]
pub struct RecoveryAction {
    /// Strategy to apply.
    pub strategy: RecoveryStrategy,
    /// Optional routine that performs the recovery.
    pub recovery_fn: Option<RecoveryFn>,
    /// Maximum number of attempts.
    pub max_retries: u8,
    /// Delay between attempts in milliseconds.
    pub retry_delay_ms: u32,
}

/// Result of [`RecoveryAction::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// The routine reported success after `attempts` tries.
    Recovered {
        /// Attempts made, including the successful one.
        attempts: u8,
    },
    /// Every attempt failed.
    Exhausted {
        /// Attempts made.
        attempts: u8,
    },
    /// No routine is attached; the caller must act on the strategy itself.
    NoRoutine,
}

impl RecoveryOutcome {
    /// Whether recovery succeeded.
    #[must_use]
    pub fn is_recovered(self) -> bool {
        matches!(self, Self::Recovered { .. })
    }
}

impl RecoveryAction {
    /// Create an action with the default retry budget and no routine.
    #[must_use]
    pub fn new(strategy: RecoveryStrategy) -> Self {
        Self {
            strategy,
            recovery_fn: None,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }

    /// Set the retry budget.
    #[must_use]
    pub fn with_retries(mut self, max_retries: u8, retry_delay_ms: u32) -> Self {
        self.max_retries = max_retries;
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    /// Attach a recovery routine.
    #[must_use]
    pub fn with_recovery_fn(mut self, f: RecoveryFn) -> Self {
        self.recovery_fn = Some(f);
        self
    }

    /// The fixed code-to-strategy table.
    #[must_use]
    pub fn for_code(code: ErrorCode) -> Self {
        match code {
            ErrorCode::Success => Self::new(RecoveryStrategy::None),
            ErrorCode::MemoryAllocationFailed => Self::new(RecoveryStrategy::ResetComponent),
            ErrorCode::SignalInitFailed | ErrorCode::PlatformInitFailed => {
                Self::new(RecoveryStrategy::ResetSubsystem)
            }
            ErrorCode::Timeout | ErrorCode::TransmitFailed => {
                Self::new(RecoveryStrategy::Retry).with_retries(5, 500)
            }
            ErrorCode::WatchdogTimeout | ErrorCode::SystemResetRequired => {
                Self::new(RecoveryStrategy::SystemReset)
            }
            _ => Self::new(RecoveryStrategy::FailSafe),
        }
    }

    /// Run the attached routine up to `max_retries` times, sleeping
    /// `retry_delay_ms` on `timer` between failed attempts.
    pub fn execute(&self, timer: &dyn Timer) -> RecoveryOutcome {
        let Some(routine) = self.recovery_fn.as_ref() else {
            return RecoveryOutcome::NoRoutine;
        };
        let attempts = self.max_retries.max(1);
        for attempt in 1..=attempts {
            if routine() {
                return RecoveryOutcome::Recovered { attempts: attempt };
            }
            if attempt < attempts {
                timer.delay_ms(self.retry_delay_ms);
            }
        }
        tracing::warn!(
            strategy = self.strategy.as_str(),
            attempts,
            "recovery routine exhausted its retries"
        );
        RecoveryOutcome::Exhausted { attempts }
    }
}

impl core::fmt::Debug for RecoveryAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RecoveryAction")
            .field("strategy", &self.strategy)
            .field("has_recovery_fn", &self.recovery_fn.is_some())
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .finish()
    }
}
