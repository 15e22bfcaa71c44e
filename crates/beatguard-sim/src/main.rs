//! beatguard-sim - run the BeatGuard safety loop on the host.

#![deny(clippy::unwrap_used)]

use anyhow::Result;
use beatguard_sim::{SimArgs, load_config, run};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status when the run ends in fail-safe mode.
const EXIT_FAIL_SAFE: u8 = 2;

fn main() -> Result<ExitCode> {
    let args = SimArgs::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if args.dump_config {
        println!("{}", load_config(&args)?.to_json_string()?);
        return Ok(ExitCode::SUCCESS);
    }

    let report = run(&args)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.safety.in_fail_safe_mode {
        Ok(ExitCode::from(EXIT_FAIL_SAFE))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
