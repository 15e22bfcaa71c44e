//! # beatguard-tasks
//!
//! Safe creation and teardown of named, prioritized, core-affine execution
//! units.
//!
//! - [`TaskManager`] validates a [`TaskConfig`] and starts the unit on a
//!   [`Scheduler`] from a capturing closure or a plain function plus parameter
//! - [`TaskHandle`] owns the unit and asks it to stop when dropped
//! - [`TaskPresets`] holds the audio-sampling, network, monitoring and
//!   background configurations
//! - [`TaskMonitor`] tracks whether a unit keeps reporting progress
//!
//! The RTOS task API sits behind the [`Scheduler`] trait. [`ThreadScheduler`]
//! maps units onto host threads for tests and the simulator.
//!
//! ## Example
//!
//! ```rust
//! use beatguard_tasks::prelude::*;
//!
//! let scheduler = ThreadScheduler::new();
//! let tasks = TaskManager::new(&scheduler);
//! let config = tasks.preset(TaskKind::Background).with_name("housekeeping");
//!
//! let handle = tasks.create_task(&config, |ctx| {
//!     while !ctx.should_stop() {
//!         std::thread::yield_now();
//!     }
//! })?;
//! handle.stop_and_join()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod handle;
pub mod manager;
pub mod monitor;
pub mod prelude;
pub mod scheduler;

pub use config::{
    CoreAffinity, DEFAULT_STACK_SIZE, MAX_STACK_SIZE, MIN_STACK_SIZE, TaskConfig, TaskKind,
    TaskPresets, TaskPriority,
};
pub use error::{SchedulerError, SchedulerResult, TaskError, TaskResult};
pub use handle::TaskHandle;
pub use manager::{HEALTHY_STACK_MARGIN, TaskManager};
pub use monitor::{DEFAULT_TASK_TIMEOUT_MS, TaskMonitor};
pub use scheduler::{
    HOST_MIN_STACK_SIZE, Scheduler, TaskBody, TaskContext, TaskId, TaskState, TaskStats,
    ThreadScheduler,
};
