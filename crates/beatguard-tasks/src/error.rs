//! Error types for task creation and scheduling.

use thiserror::Error;

/// Errors raised by a [`Scheduler`](crate::Scheduler) backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// The backend could not start the unit.
    #[error("Failed to spawn task '{name}': {reason}")]
    Spawn {
        /// Requested task name.
        name: String,
        /// Backend-specific reason.
        reason: String,
    },

    /// No unit with this id is known to the scheduler.
    #[error("Unknown task id {0}")]
    UnknownTask(u64),

    /// The unit panicked before finishing.
    #[error("Task '{0}' panicked")]
    Panicked(String),
}

/// Errors returned by the [`TaskManager`](crate::TaskManager).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The configuration cannot describe a valid unit.
    #[error("Invalid task parameters: {0}")]
    InvalidParameters(String),

    /// The requested stack cannot be provided.
    #[error("Insufficient memory for a {requested}-byte stack")]
    InsufficientMemory {
        /// Requested stack size in bytes.
        requested: u32,
    },

    /// The scheduler refused to create the unit.
    #[error("Task creation failed: {0}")]
    CreationFailed(#[from] SchedulerError),
}

impl TaskError {
    /// Create an invalid parameters error.
    #[must_use]
    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }
}

/// A specialized `Result` type for task operations.
pub type TaskResult<T> = Result<T, TaskError>;

/// A specialized `Result` type for scheduler backends.
pub type SchedulerResult<T> = Result<T, SchedulerError>;
