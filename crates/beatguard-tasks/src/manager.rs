//! Task creation with presets and health introspection.

use crate::config::{DEFAULT_STACK_SIZE, TaskConfig, TaskKind, TaskPresets};
use crate::error::TaskResult;
use crate::handle::TaskHandle;
use crate::scheduler::{Scheduler, TaskContext, TaskStats};
use tracing::{error, info};

/// Minimum unused stack for a unit to count as healthy.
pub const HEALTHY_STACK_MARGIN: u32 = 512;

/// Creates execution units on a [`Scheduler`] and answers health queries.
pub struct TaskManager<'s> {
    scheduler: &'s dyn Scheduler,
    presets: TaskPresets,
}

impl<'s> TaskManager<'s> {
    /// Manager with the built-in presets.
    #[must_use]
    pub fn new(scheduler: &'s dyn Scheduler) -> Self {
        Self::with_presets(scheduler, TaskPresets::default())
    }

    /// Manager with caller-supplied presets.
    #[must_use]
    pub fn with_presets(scheduler: &'s dyn Scheduler, presets: TaskPresets) -> Self {
        Self { scheduler, presets }
    }

    /// Presets in use.
    #[must_use]
    pub fn presets(&self) -> &TaskPresets {
        &self.presets
    }

    /// Copy of the preset for `kind`, ready for overrides.
    #[must_use]
    pub fn preset(&self, kind: TaskKind) -> TaskConfig {
        self.presets.get(kind).clone()
    }

    /// Start a unit running `body`.
    ///
    /// The closure is owned by the unit and dropped when it exits, or
    /// dropped here if creation fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the scheduler
    /// refuses the unit.
    pub fn create_task<F>(&self, config: &TaskConfig, body: F) -> TaskResult<TaskHandle<'s>>
    where
        F: FnOnce(TaskContext) + Send + 'static,
    {
        config.validate()?;
        match self.scheduler.spawn(config, Box::new(body)) {
            Ok(id) => {
                info!(
                    task = %config.name,
                    stack_size = config.stack_size,
                    priority = config.priority.as_raw(),
                    affinity = config.core_affinity.bits(),
                    "Task created"
                );
                Ok(TaskHandle::new(id, config.name.to_string(), self.scheduler))
            }
            Err(e) => {
                error!(task = %config.name, error = %e, "Task creation failed");
                Err(e.into())
            }
        }
    }

    /// Start a unit running a plain function with one owned parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the scheduler
    /// refuses the unit.
    pub fn create_task_fn<P>(
        &self,
        config: &TaskConfig,
        function: fn(P, TaskContext),
        parameter: P,
    ) -> TaskResult<TaskHandle<'s>>
    where
        P: Send + 'static,
    {
        self.create_task(config, move |ctx| function(parameter, ctx))
    }

    /// Whether the unit is alive with more than 512 bytes of unused stack.
    #[must_use]
    pub fn is_task_healthy(&self, handle: &TaskHandle<'_>) -> bool {
        handle
            .stack_high_water_mark()
            .is_some_and(|hwm| hwm > HEALTHY_STACK_MARGIN)
    }

    /// Unused stack of a unit in bytes.
    #[must_use]
    pub fn stack_high_water_mark(&self, handle: &TaskHandle<'_>) -> Option<u32> {
        handle.stack_high_water_mark()
    }

    /// Counts across all units on the scheduler.
    #[must_use]
    pub fn task_stats(&self) -> TaskStats {
        self.scheduler.stats()
    }

    /// Stack size recommended for a workload kind.
    #[must_use]
    pub fn recommended_stack_size(&self, kind: TaskKind) -> u32 {
        self.presets.get(kind).stack_size
    }

    /// Stack size recommended for a named workload, with a 4 KiB default for
    /// unknown names.
    #[must_use]
    pub fn recommended_stack_size_for(&self, kind: &str) -> u32 {
        kind.parse::<TaskKind>()
            .map_or(DEFAULT_STACK_SIZE, |k| self.recommended_stack_size(k))
    }
}

impl core::fmt::Debug for TaskManager<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TaskManager")
            .field("presets", &self.presets)
            .finish_non_exhaustive()
    }
}
