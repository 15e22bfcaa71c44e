//! The monitoring loop.

use crate::args::{FaultPlan, SimArgs};
use crate::pipeline::{Frame, Pipeline};
use anyhow::{Context, Result};
use beatguard_errors::{ErrorCode, ErrorSeverity};
use beatguard_memory::MemoryMonitor;
use beatguard_platform::{HostPlatform, ManualTimer, StdTimer, Timer, TracingLogger};
use beatguard_power::{ActivityLevel, PowerManager, PowerStats};
use beatguard_safety::{FirmwareConfig, SafetyManager, SafetyStatus};
use beatguard_tasks::{TaskKind, TaskManager, TaskMonitor, TaskStats, ThreadScheduler};
use portable_atomic::{AtomicBool, Ordering};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Free heap of the simulated device while healthy.
pub const HEALTHY_FREE_HEAP: u32 = 200 * 1024;

/// Stack headroom of the simulated device while healthy.
pub const HEALTHY_STACK_HWM: u32 = 2_048;

const LOW_FREE_HEAP: u32 = 4 * 1024;
const RISKY_STACK_HWM: u32 = 256;
const ACK_WAIT: Duration = Duration::from_millis(250);

/// Final state of a run, printed as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    /// Ticks executed.
    pub ticks: u64,
    /// Clock reading at the end of the run.
    pub elapsed_ms: u64,
    /// Ticks whose due health or memory checks failed.
    ///
    /// Ticks that only failed at the feed gate are counted in
    /// `gate_refusals` instead.
    pub failed_ticks: u64,
    /// Times the watchdog gate refused to feed.
    pub gate_refusals: u64,
    /// Frames the pipeline acknowledged.
    pub frames_acknowledged: u64,
    /// Outcome of the scheduled recovery attempt, if one was scheduled.
    pub recovery_succeeded: Option<bool>,
    /// Restarts forced by the watchdog.
    pub restarts: u32,
    /// Error reports lost to a full queue.
    pub dropped_reports: u32,
    /// Pipeline stack headroom above the healthy margin at the end of the run.
    pub pipeline_healthy: bool,
    /// Safety subsystem.
    pub safety: SafetyStatus,
    /// Power manager.
    pub power: PowerStats,
    /// Scheduler counts before shutdown.
    pub tasks: TaskStats,
}

/// Read the configuration named on the command line, or the defaults.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is invalid.
pub fn load_config(args: &SimArgs) -> Result<FirmwareConfig> {
    match &args.config {
        Some(path) => FirmwareConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(FirmwareConfig::default()),
    }
}

/// Run the monitoring loop for `args.ticks` ticks.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or a component cannot
/// start.
pub fn run(args: &SimArgs) -> Result<SimReport> {
    let config = load_config(args)?;

    let platform = HostPlatform::builder()
        .name("beatguard-sim")
        .free_heap(HEALTHY_FREE_HEAP)
        .largest_free_block(HEALTHY_FREE_HEAP)
        .stack_high_water_mark(HEALTHY_STACK_HWM)
        .with_watchdog(!args.no_hardware_watchdog)
        .build();
    let timer: Box<dyn Timer> = if args.wall_clock {
        Box::new(StdTimer::new())
    } else {
        Box::new(ManualTimer::new())
    };
    let timer = timer.as_ref();
    let logger = TracingLogger::new();
    let memory = MemoryMonitor::new(&platform);
    let scheduler = ThreadScheduler::new();

    let mut safety = SafetyManager::new(&platform, timer, &logger, &memory, config.safety)
        .context("starting safety manager")?;
    let mut power =
        PowerManager::new(timer, &platform, config.power).context("starting power manager")?;
    let tasks = TaskManager::with_presets(&scheduler, config.tasks.clone());

    let pipeline = Pipeline::spawn(&tasks, safety.reporter()).context("starting pipeline")?;
    let mut pipeline_monitor = TaskMonitor::with_timeout(
        timer,
        pipeline.handle().name(),
        u64::from(tasks.preset(TaskKind::Audio).watchdog_timeout_ms),
    );

    let responsive = Arc::new(AtomicBool::new(true));
    let health_flag = Arc::clone(&responsive);
    safety.register_health_check(Arc::new(move || health_flag.load(Ordering::Acquire)));

    info!(ticks = args.ticks, tick_ms = args.tick_ms, wall_clock = args.wall_clock, "simulation started");

    let faults = args.faults;
    let mut failed_ticks: u64 = 0;
    let mut frames_acknowledged: u64 = 0;
    let mut recovery_succeeded = None;

    for tick in 1..=args.ticks {
        timer.delay_ms(args.tick_ms);
        inject_faults(&faults, tick, &platform, &pipeline);

        let frame = Frame {
            tick,
            inject_overflow: faults.overflow_at == Some(tick),
        };
        if !pipeline.submit(frame) {
            safety.report_error(
                ErrorCode::QueueFull,
                ErrorSeverity::Warning,
                "Detection frame queue full",
            );
        }
        if pipeline.wait_for_ack(ACK_WAIT).is_some() {
            pipeline_monitor.report_activity();
            frames_acknowledged = frames_acknowledged.saturating_add(1);
        }
        responsive.store(pipeline_monitor.is_responsive(), Ordering::Release);

        if faults.is_active_at(tick) {
            power.update_activity(ActivityLevel::High);
        }
        power.execute_power_management();

        if !safety.execute_safety_checks() {
            failed_ticks = failed_ticks.saturating_add(1);
            warn!(tick, silence_ms = pipeline_monitor.silence_ms(), "safety checks failed");
        }

        if faults.recover_at == Some(tick) {
            let recovered = safety.attempt_recovery();
            info!(tick, recovered, "recovery attempted");
            recovery_succeeded = Some(recovered);
        }
    }

    let pipeline_healthy = tasks.is_task_healthy(pipeline.handle());
    let task_stats = tasks.task_stats();
    pipeline.shutdown().context("stopping pipeline")?;

    let report = SimReport {
        ticks: args.ticks,
        elapsed_ms: timer.millis(),
        failed_ticks,
        gate_refusals: safety
            .watchdog_manager()
            .map_or(0, |watchdog| watchdog.metrics().failed_checks),
        frames_acknowledged,
        recovery_succeeded,
        restarts: platform.restart_count(),
        dropped_reports: safety.monitor().dropped_reports(),
        pipeline_healthy,
        safety: safety.safety_status(),
        power: power.power_stats(),
        tasks: task_stats,
    };
    info!(
        failed_ticks,
        gate_refusals = report.gate_refusals,
        fail_safe = report.safety.in_fail_safe_mode,
        "simulation finished"
    );
    Ok(report)
}

fn inject_faults(faults: &FaultPlan, tick: u64, platform: &HostPlatform, pipeline: &Pipeline<'_>) {
    if faults.stall_pipeline_at == Some(tick) {
        warn!(tick, "injecting pipeline stall");
        pipeline.control().set_stalled(true);
    }
    if faults.low_memory_at == Some(tick) {
        warn!(tick, free_heap = LOW_FREE_HEAP, "injecting low memory");
        platform.set_free_heap(LOW_FREE_HEAP);
        platform.set_largest_free_block(Some(LOW_FREE_HEAP));
    }
    if faults.stack_risk_at == Some(tick) {
        warn!(tick, stack_hwm = RISKY_STACK_HWM, "injecting stack risk");
        platform.set_stack_high_water_mark(Some(RISKY_STACK_HWM));
    }
    if faults.recover_at == Some(tick) {
        info!(tick, "clearing injected faults");
        pipeline.control().set_stalled(false);
        platform.set_free_heap(HEALTHY_FREE_HEAP);
        platform.set_largest_free_block(Some(HEALTHY_FREE_HEAP));
        platform.set_stack_high_water_mark(Some(HEALTHY_STACK_HWM));
    }
}
