//! # beatguard-sim
//!
//! Host simulator for the BeatGuard safety loop.
//!
//! [`run`] wires a [`HostPlatform`](beatguard_platform::HostPlatform) to the
//! safety manager, the power manager and a stand-in detection pipeline task,
//! then ticks them the way the firmware's monitoring task does. Faults listed
//! in a [`FaultPlan`] are injected at fixed ticks and the final state comes
//! back as a [`SimReport`].
//!
//! ## Example
//!
//! ```rust
//! use beatguard_sim::{SimArgs, run};
//! use clap::Parser;
//!
//! let args = SimArgs::try_parse_from(["beatguard-sim", "--ticks", "5"])?;
//! let report = run(&args)?;
//! assert_eq!(report.failed_ticks, 0);
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

pub mod args;
pub mod pipeline;
pub mod simulation;

pub use args::{FaultPlan, SimArgs};
pub use pipeline::{Frame, Pipeline, PipelineControl};
pub use simulation::{SimReport, load_config, run};
