//! Per-task responsiveness tracking.

use beatguard_platform::Timer;

/// Default silence tolerated before a task counts as unresponsive.
pub const DEFAULT_TASK_TIMEOUT_MS: u64 = 30_000;

/// Tracks when a task last reported progress.
pub struct TaskMonitor<'a> {
    timer: &'a dyn Timer,
    name: String,
    timeout_ms: u64,
    last_activity_ms: u64,
}

impl<'a> TaskMonitor<'a> {
    /// Start tracking with the default timeout. Creation counts as activity.
    pub fn new(timer: &'a dyn Timer, name: impl Into<String>) -> Self {
        Self::with_timeout(timer, name, DEFAULT_TASK_TIMEOUT_MS)
    }

    /// Start tracking with a custom timeout.
    pub fn with_timeout(timer: &'a dyn Timer, name: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            timer,
            name: name.into(),
            timeout_ms,
            last_activity_ms: timer.millis(),
        }
    }

    /// Record progress.
    pub fn report_activity(&mut self) {
        self.last_activity_ms = self.timer.millis();
    }

    /// Whether the task reported within the timeout.
    #[must_use]
    pub fn is_responsive(&self) -> bool {
        self.silence_ms() <= self.timeout_ms
    }

    /// Milliseconds since the last report.
    #[must_use]
    pub fn silence_ms(&self) -> u64 {
        self.timer.millis().saturating_sub(self.last_activity_ms)
    }

    /// Monitored task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured timeout.
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }
}

impl core::fmt::Debug for TaskMonitor<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TaskMonitor")
            .field("name", &self.name)
            .field("timeout_ms", &self.timeout_ms)
            .field("last_activity_ms", &self.last_activity_ms)
            .finish_non_exhaustive()
    }
}
