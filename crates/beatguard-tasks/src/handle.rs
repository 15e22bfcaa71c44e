//! Owning handle to a running unit.

use crate::error::SchedulerResult;
use crate::scheduler::{Scheduler, TaskId, TaskState};

/// Owning handle to an execution unit.
///
/// Dropping the handle asks the unit to stop. [`detach`](Self::detach) hands
/// ownership to the unit itself instead, and [`join`](Self::join) waits for it
/// to finish. Handles are move-only.
#[must_use = "dropping a TaskHandle stops the task"]
pub struct TaskHandle<'s> {
    id: Option<TaskId>,
    name: String,
    scheduler: &'s dyn Scheduler,
}

impl<'s> TaskHandle<'s> {
    pub(crate) fn new(id: TaskId, name: String, scheduler: &'s dyn Scheduler) -> Self {
        Self {
            id: Some(id),
            name,
            scheduler,
        }
    }

    /// Unit identifier, unless the handle was emptied.
    #[must_use]
    pub fn id(&self) -> Option<TaskId> {
        self.id
    }

    /// Whether the handle still owns a unit.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.id.is_some()
    }

    /// Unit name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state, if the unit is still known to the scheduler.
    #[must_use]
    pub fn state(&self) -> Option<TaskState> {
        self.id.and_then(|id| self.scheduler.state(id))
    }

    /// Unused stack in bytes.
    #[must_use]
    pub fn stack_high_water_mark(&self) -> Option<u32> {
        self.id
            .and_then(|id| self.scheduler.stack_high_water_mark(id))
    }

    /// Ask the unit to stop now and empty the handle.
    pub fn delete_task(&mut self) {
        if let Some(id) = self.id.take() {
            self.scheduler.request_stop(id);
            self.scheduler.release(id);
        }
    }

    /// Let the unit run to completion on its own.
    pub fn detach(mut self) -> Option<TaskId> {
        let id = self.id.take();
        if let Some(id) = id {
            self.scheduler.release(id);
        }
        id
    }

    /// Ask the unit to stop and wait for it.
    ///
    /// # Errors
    ///
    /// Returns the scheduler's join error, including a panic in the unit.
    pub fn stop_and_join(mut self) -> SchedulerResult<()> {
        match self.id.take() {
            Some(id) => {
                self.scheduler.request_stop(id);
                self.scheduler.join(id)
            }
            None => Ok(()),
        }
    }

    /// Wait for the unit to finish without asking it to stop.
    ///
    /// # Errors
    ///
    /// Returns the scheduler's join error, including a panic in the unit.
    pub fn join(mut self) -> SchedulerResult<()> {
        match self.id.take() {
            Some(id) => self.scheduler.join(id),
            None => Ok(()),
        }
    }
}

impl Drop for TaskHandle<'_> {
    fn drop(&mut self) {
        self.delete_task();
    }
}

impl core::fmt::Debug for TaskHandle<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
