//! Scheduler seam and the host thread backend.

use crate::config::TaskConfig;
use crate::error::{SchedulerError, SchedulerResult};
use parking_lot::Mutex;
use portable_atomic::{AtomicBool, AtomicU8, AtomicU32, AtomicU64, Ordering};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, error};

/// Smallest stack given to a host thread, whatever the configured size.
pub const HOST_MIN_STACK_SIZE: usize = 64 * 1024;

/// Body executed by a unit.
pub type TaskBody = Box<dyn FnOnce(TaskContext) + Send + 'static>;

/// Scheduler-assigned unit identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub u64);

impl core::fmt::Display for TaskId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum TaskState {
    /// Created, not yet running.
    Ready = 0,
    /// Executing its body.
    Running = 1,
    /// Waiting on a resource.
    Blocked = 2,
    /// Suspended by the scheduler.
    Suspended = 3,
    /// Body returned or panicked.
    Finished = 4,
}

impl TaskState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Ready,
            1 => Self::Running,
            2 => Self::Blocked,
            3 => Self::Suspended,
            _ => Self::Finished,
        }
    }
}

/// Per-state unit counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    /// Units known to the scheduler.
    pub total_tasks: u32,
    /// Units created but not started.
    pub ready_tasks: u32,
    /// Units executing.
    pub running_tasks: u32,
    /// Units waiting on a resource.
    pub blocked_tasks: u32,
    /// Suspended units.
    pub suspended_tasks: u32,
    /// Units whose body has returned.
    pub finished_tasks: u32,
}

impl TaskStats {
    fn count(&mut self, state: TaskState) {
        self.total_tasks = self.total_tasks.saturating_add(1);
        let slot = match state {
            TaskState::Ready => &mut self.ready_tasks,
            TaskState::Running => &mut self.running_tasks,
            TaskState::Blocked => &mut self.blocked_tasks,
            TaskState::Suspended => &mut self.suspended_tasks,
            TaskState::Finished => &mut self.finished_tasks,
        };
        *slot = slot.saturating_add(1);
    }
}

#[derive(Debug)]
struct TaskShared {
    id: TaskId,
    name: String,
    stack_size: u32,
    stop: AtomicBool,
    peak_stack_usage: AtomicU32,
    state: AtomicU8,
}

impl TaskShared {
    fn state(&self) -> TaskState {
        TaskState::from_raw(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: TaskState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn high_water_mark(&self) -> u32 {
        self.stack_size
            .saturating_sub(self.peak_stack_usage.load(Ordering::Acquire))
    }
}

/// Handle given to a running unit.
///
/// Units poll [`should_stop`](Self::should_stop) at safe points and return
/// when it turns true. Host backends cannot measure stack depth, so units
/// report their own usage through [`record_stack_usage`](Self::record_stack_usage).
#[derive(Debug, Clone)]
pub struct TaskContext {
    shared: Arc<TaskShared>,
}

impl TaskContext {
    /// Unit identifier.
    #[must_use]
    pub fn id(&self) -> TaskId {
        self.shared.id
    }

    /// Unit name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Whether termination has been requested.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.shared.stop.load(Ordering::Acquire)
    }

    /// Record a stack usage sample in bytes. The peak is kept.
    pub fn record_stack_usage(&self, bytes: u32) {
        self.shared
            .peak_stack_usage
            .fetch_max(bytes.min(self.shared.stack_size), Ordering::AcqRel);
    }

    /// Mark the unit blocked or running.
    pub fn set_blocked(&self, blocked: bool) {
        self.shared.set_state(if blocked {
            TaskState::Blocked
        } else {
            TaskState::Running
        });
    }
}

/// Backend that runs execution units.
///
/// On target this wraps the RTOS task API; on the host [`ThreadScheduler`]
/// maps units to OS threads.
pub trait Scheduler: Send + Sync {
    /// Start a unit.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Spawn`] if the backend cannot start it. The
    /// body is dropped in that case.
    fn spawn(&self, config: &TaskConfig, body: TaskBody) -> SchedulerResult<TaskId>;

    /// Ask a unit to stop at its next safe point.
    fn request_stop(&self, id: TaskId);

    /// Forget a unit once it has finished, without asking it to stop.
    fn release(&self, id: TaskId);

    /// Wait for a unit to finish.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::UnknownTask`] if the unit is unknown or was
    /// already joined, and [`SchedulerError::Panicked`] if its body panicked.
    fn join(&self, id: TaskId) -> SchedulerResult<()>;

    /// Current state, if the unit is known.
    fn state(&self, id: TaskId) -> Option<TaskState>;

    /// Unused stack in bytes, if the unit is known and alive.
    fn stack_high_water_mark(&self, id: TaskId) -> Option<u32>;

    /// Unit name, if known.
    fn task_name(&self, id: TaskId) -> Option<String>;

    /// Counts across all known units.
    fn stats(&self) -> TaskStats;
}

#[derive(Debug)]
struct TaskEntry {
    shared: Arc<TaskShared>,
    join: Option<JoinHandle<bool>>,
    orphaned: bool,
}

/// Host scheduler running each unit on its own OS thread.
///
/// Priority and affinity are recorded but not enforced. Termination is
/// cooperative through [`TaskContext::should_stop`].
#[derive(Debug, Default)]
pub struct ThreadScheduler {
    registry: Arc<Mutex<HashMap<TaskId, TaskEntry>>>,
    next_id: AtomicU64,
}

impl ThreadScheduler {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn reap(registry: &mut HashMap<TaskId, TaskEntry>) {
        registry.retain(|_, entry| !(entry.orphaned && entry.shared.state() == TaskState::Finished));
    }
}

impl Scheduler for ThreadScheduler {
    fn spawn(&self, config: &TaskConfig, body: TaskBody) -> SchedulerResult<TaskId> {
        let id = TaskId(self.next_id.fetch_add(1, Ordering::AcqRel));
        let shared = Arc::new(TaskShared {
            id,
            name: config.name.to_string(),
            stack_size: config.stack_size,
            stop: AtomicBool::new(false),
            peak_stack_usage: AtomicU32::new(0),
            state: AtomicU8::new(TaskState::Ready as u8),
        });
        let context = TaskContext {
            shared: Arc::clone(&shared),
        };
        let registry = Arc::clone(&self.registry);

        let stack = usize::try_from(config.stack_size)
            .unwrap_or(HOST_MIN_STACK_SIZE)
            .max(HOST_MIN_STACK_SIZE);

        let handle = std::thread::Builder::new()
            .name(config.name.to_string())
            .stack_size(stack)
            .spawn(move || {
                let shared = Arc::clone(&context.shared);
                shared.set_state(TaskState::Running);
                let panicked = catch_unwind(AssertUnwindSafe(|| body(context))).is_err();
                if panicked {
                    error!(task = %shared.name, "Task panicked");
                }
                shared.set_state(TaskState::Finished);
                ThreadScheduler::reap(&mut registry.lock());
                panicked
            })
            .map_err(|e| SchedulerError::Spawn {
                name: config.name.to_string(),
                reason: e.to_string(),
            })?;

        let mut registry = self.registry.lock();
        registry.insert(
            id,
            TaskEntry {
                shared,
                join: Some(handle),
                orphaned: false,
            },
        );
        debug!(task = %config.name, %id, priority = config.priority.as_raw(), "Task spawned");
        Ok(id)
    }

    fn request_stop(&self, id: TaskId) {
        if let Some(entry) = self.registry.lock().get(&id) {
            entry.shared.stop.store(true, Ordering::Release);
        }
    }

    fn release(&self, id: TaskId) {
        let mut registry = self.registry.lock();
        if let Some(entry) = registry.get_mut(&id) {
            entry.orphaned = true;
        }
        Self::reap(&mut registry);
    }

    fn join(&self, id: TaskId) -> SchedulerResult<()> {
        let (handle, name) = {
            let mut registry = self.registry.lock();
            let entry = registry.get_mut(&id).ok_or(SchedulerError::UnknownTask(id.0))?;
            let handle = entry.join.take().ok_or(SchedulerError::UnknownTask(id.0))?;
            (handle, entry.shared.name.clone())
        };

        let panicked = handle.join().unwrap_or(true);
        self.registry.lock().remove(&id);
        if panicked {
            Err(SchedulerError::Panicked(name))
        } else {
            Ok(())
        }
    }

    fn state(&self, id: TaskId) -> Option<TaskState> {
        self.registry.lock().get(&id).map(|e| e.shared.state())
    }

    fn stack_high_water_mark(&self, id: TaskId) -> Option<u32> {
        self.registry
            .lock()
            .get(&id)
            .filter(|e| e.shared.state() != TaskState::Finished)
            .map(|e| e.shared.high_water_mark())
    }

    fn task_name(&self, id: TaskId) -> Option<String> {
        self.registry.lock().get(&id).map(|e| e.shared.name.clone())
    }

    fn stats(&self) -> TaskStats {
        let mut registry = self.registry.lock();
        Self::reap(&mut registry);
        registry
            .values()
            .fold(TaskStats::default(), |mut stats, entry| {
                stats.count(entry.shared.state());
                stats
            })
    }
}
