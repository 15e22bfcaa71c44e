//! Task configuration and the built-in presets.

use crate::error::{TaskError, TaskResult};
use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::borrow::Cow;
use std::str::FromStr;

/// Smallest stack a task may request.
pub const MIN_STACK_SIZE: u32 = 1024;

/// Largest stack a task may request.
pub const MAX_STACK_SIZE: u32 = 64 * 1024;

/// Stack size recommended when nothing more specific is known.
pub const DEFAULT_STACK_SIZE: u32 = 4096;

/// Scheduling priority. Higher values preempt lower ones.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum TaskPriority {
    /// Background work.
    Low = 1,
    /// Ordinary work.
    #[default]
    Normal = 2,
    /// Sampling and other latency-sensitive work.
    High = 3,
    /// System-critical work.
    Critical = 4,
}

impl TaskPriority {
    /// Numeric priority handed to the scheduler.
    #[must_use]
    pub fn as_raw(self) -> u8 {
        self as u8
    }
}

bitflags! {
    /// Cores a task may run on.
    ///
    /// Serialized as the raw bitmask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CoreAffinity: u8 {
        /// Protocol core.
        const CORE0 = 0x01;
        /// Application core.
        const CORE1 = 0x02;
        /// Either core.
        const ANY = Self::CORE0.bits() | Self::CORE1.bits();
    }
}

impl CoreAffinity {
    /// Core the task is pinned to when exactly one is allowed.
    #[must_use]
    pub fn pinned_core(self) -> Option<u8> {
        if self == Self::CORE0 {
            Some(0)
        } else if self == Self::CORE1 {
            Some(1)
        } else {
            None
        }
    }
}

impl Default for CoreAffinity {
    fn default() -> Self {
        Self::ANY
    }
}

impl Serialize for CoreAffinity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for CoreAffinity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u8::deserialize(deserializer)?;
        Self::from_bits(bits)
            .ok_or_else(|| de::Error::custom(format!("unknown core affinity bits {bits:#04x}")))
    }
}

/// Parameters for a single execution unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Unit name, visible in scheduler introspection.
    pub name: Cow<'static, str>,
    /// Stack size in bytes.
    pub stack_size: u32,
    /// Scheduling priority.
    pub priority: TaskPriority,
    /// Allowed cores.
    pub core_affinity: CoreAffinity,
    /// Longest silence before the unit counts as unresponsive.
    pub watchdog_timeout_ms: u32,
}

impl TaskConfig {
    /// Create a configuration with default stack, priority and affinity.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            stack_size: DEFAULT_STACK_SIZE,
            priority: TaskPriority::Normal,
            core_affinity: CoreAffinity::ANY,
            watchdog_timeout_ms: 30_000,
        }
    }

    /// Override the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Override the stack size.
    #[must_use]
    pub fn with_stack_size(mut self, bytes: u32) -> Self {
        self.stack_size = bytes;
        self
    }

    /// Override the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Override the core affinity.
    #[must_use]
    pub fn with_core_affinity(mut self, affinity: CoreAffinity) -> Self {
        self.core_affinity = affinity;
        self
    }

    /// Override the responsiveness timeout.
    #[must_use]
    pub fn with_watchdog_timeout_ms(mut self, ms: u32) -> Self {
        self.watchdog_timeout_ms = ms;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::InvalidParameters`] for an empty name, an empty
    /// affinity mask or a zero timeout, and [`TaskError::InsufficientMemory`]
    /// for a stack outside the supported range.
    pub fn validate(&self) -> TaskResult<()> {
        if self.name.trim().is_empty() {
            return Err(TaskError::invalid_parameters("task name must not be empty"));
        }
        if self.core_affinity.is_empty() {
            return Err(TaskError::invalid_parameters(
                "core affinity must allow at least one core",
            ));
        }
        if self.watchdog_timeout_ms == 0 {
            return Err(TaskError::invalid_parameters(
                "watchdog_timeout_ms must be non-zero",
            ));
        }
        if !(MIN_STACK_SIZE..=MAX_STACK_SIZE).contains(&self.stack_size) {
            return Err(TaskError::InsufficientMemory {
                requested: self.stack_size,
            });
        }
        Ok(())
    }
}

/// The four preset workload kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Sensor sampling.
    Audio,
    /// Network I/O.
    Network,
    /// Safety monitoring loop.
    Monitoring,
    /// Housekeeping.
    Background,
}

impl TaskKind {
    /// All kinds.
    pub const ALL: [Self; 4] = [Self::Audio, Self::Network, Self::Monitoring, Self::Background];

    /// Get the kind as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Network => "network",
            Self::Monitoring => "monitoring",
            Self::Background => "background",
        }
    }
}

impl FromStr for TaskKind {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| TaskError::invalid_parameters(format!("unknown task kind '{s}'")))
    }
}

/// Preset configurations, one per [`TaskKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskPresets {
    /// Sampling task: 4 KiB, high priority, core 0, 1 s.
    pub audio: TaskConfig,
    /// Network task: 8 KiB, normal priority, any core, 5 s.
    pub network: TaskConfig,
    /// Monitoring task: 4 KiB, normal priority, core 1, 10 s.
    pub monitoring: TaskConfig,
    /// Background task: 3 KiB, low priority, any core, 30 s.
    pub background: TaskConfig,
}

impl Default for TaskPresets {
    fn default() -> Self {
        Self {
            audio: TaskConfig {
                name: Cow::Borrowed("AudioSampling"),
                stack_size: 4096,
                priority: TaskPriority::High,
                core_affinity: CoreAffinity::CORE0,
                watchdog_timeout_ms: 1_000,
            },
            network: TaskConfig {
                name: Cow::Borrowed("NetworkTask"),
                stack_size: 8192,
                priority: TaskPriority::Normal,
                core_affinity: CoreAffinity::ANY,
                watchdog_timeout_ms: 5_000,
            },
            monitoring: TaskConfig {
                name: Cow::Borrowed("MonitoringTask"),
                stack_size: 4096,
                priority: TaskPriority::Normal,
                core_affinity: CoreAffinity::CORE1,
                watchdog_timeout_ms: 10_000,
            },
            background: TaskConfig {
                name: Cow::Borrowed("BackgroundTask"),
                stack_size: 3072,
                priority: TaskPriority::Low,
                core_affinity: CoreAffinity::ANY,
                watchdog_timeout_ms: 30_000,
            },
        }
    }
}

impl TaskPresets {
    /// Preset for a kind.
    #[must_use]
    pub fn get(&self, kind: TaskKind) -> &TaskConfig {
        match kind {
            TaskKind::Audio => &self.audio,
            TaskKind::Network => &self.network,
            TaskKind::Monitoring => &self.monitoring,
            TaskKind::Background => &self.background,
        }
    }

    /// Validate every preset.
    ///
    /// # Errors
    ///
    /// Returns the first preset validation failure.
    pub fn validate(&self) -> TaskResult<()> {
        TaskKind::ALL
            .into_iter()
            .try_for_each(|kind| self.get(kind).validate())
    }
}
