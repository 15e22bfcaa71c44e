//! Command-line arguments.

use clap::{Args, Parser};
use std::path::PathBuf;

/// Run the BeatGuard safety loop on the host.
#[derive(Debug, Clone, Parser)]
#[command(name = "beatguard-sim")]
#[command(about = "Run the BeatGuard safety loop on the host with fault injection")]
#[command(version)]
#[command(long_about = "
beatguard-sim drives the safety manager, power manager and a stand-in
detection pipeline task the way the firmware's monitoring task does, then
prints the final status as JSON on stdout.

Time is simulated by default so runs are instant and reproducible. Faults are
injected at fixed tick numbers; ticks are counted from 1.
")]
pub struct SimArgs {
    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Firmware configuration file (JSON)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub dump_config: bool,

    /// Number of monitoring ticks to run
    #[arg(long, default_value_t = 60)]
    pub ticks: u64,

    /// Milliseconds between monitoring ticks
    #[arg(long, default_value_t = 1_000, value_parser = clap::value_parser!(u32).range(1..))]
    pub tick_ms: u32,

    /// Follow the wall clock instead of simulated time
    #[arg(long)]
    pub wall_clock: bool,

    /// Simulate a chip without a hardware watchdog
    #[arg(long)]
    pub no_hardware_watchdog: bool,

    /// Fault injection schedule
    #[command(flatten)]
    pub faults: FaultPlan,
}

/// Faults to inject, keyed by tick number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Args)]
pub struct FaultPlan {
    /// Stop the detection pipeline from acknowledging frames
    #[arg(long, value_name = "TICK")]
    pub stall_pipeline_at: Option<u64>,

    /// Drop free heap below the low-memory threshold
    #[arg(long, value_name = "TICK")]
    pub low_memory_at: Option<u64>,

    /// Drop stack headroom below the safety margin
    #[arg(long, value_name = "TICK")]
    pub stack_risk_at: Option<u64>,

    /// Make the pipeline report a sample buffer overflow
    #[arg(long, value_name = "TICK")]
    pub overflow_at: Option<u64>,

    /// Stop reporting pipeline activity to the power manager after this tick
    #[arg(long, value_name = "TICK")]
    pub idle_after: Option<u64>,

    /// Clear injected faults and attempt fail-safe recovery
    #[arg(long, value_name = "TICK")]
    pub recover_at: Option<u64>,
}

impl FaultPlan {
    /// Whether the device is still busy at `tick`.
    #[must_use]
    pub fn is_active_at(&self, tick: u64) -> bool {
        self.idle_after.is_none_or(|last| tick <= last)
    }
}
