//! Convenience re-exports for task management.

pub use crate::config::{CoreAffinity, TaskConfig, TaskKind, TaskPresets, TaskPriority};
pub use crate::error::{SchedulerError, TaskError, TaskResult};
pub use crate::handle::TaskHandle;
pub use crate::manager::TaskManager;
pub use crate::monitor::TaskMonitor;
pub use crate::scheduler::{Scheduler, TaskContext, TaskId, TaskState, TaskStats, ThreadScheduler};
