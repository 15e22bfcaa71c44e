//! End-to-end runs of the monitoring loop with injected faults.

#![cfg(test)]

use beatguard_power::PowerMode;
use beatguard_sim::{SimArgs, load_config, run};
use clap::Parser;
use std::io::Write;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn args(extra: &[&str]) -> Result<SimArgs, clap::Error> {
    SimArgs::try_parse_from(std::iter::once("beatguard-sim").chain(extra.iter().copied()))
}

fn config_file(json: &str) -> Result<tempfile::NamedTempFile, std::io::Error> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(json.as_bytes())?;
    Ok(file)
}

mod healthy {
    use super::*;

    #[test]
    fn clean_run_passes_every_tick() -> TestResult {
        let report = run(&args(&["--ticks", "12"])?)?;
        assert_eq!(report.ticks, 12);
        assert_eq!(report.elapsed_ms, 12_000);
        assert_eq!(report.failed_ticks, 0);
        assert_eq!(report.gate_refusals, 0);
        assert_eq!(report.frames_acknowledged, 12);
        assert_eq!(report.restarts, 0);
        assert!(report.pipeline_healthy);
        assert!(!report.safety.in_fail_safe_mode);
        assert_eq!(report.safety.error_count, 0);
        assert_eq!(report.power.current_mode, PowerMode::Performance);
        assert_eq!(report.tasks.total_tasks, 1);
        Ok(())
    }

    #[test]
    fn report_serializes_to_json() -> TestResult {
        let report = run(&args(&["--ticks", "2"])?)?;
        let json = serde_json::to_value(&report)?;
        assert_eq!(json["ticks"], 2);
        assert_eq!(json["safety"]["in_fail_safe_mode"], false);
        assert_eq!(json["power"]["current_mode"], "performance");
        assert!(json["recovery_succeeded"].is_null());
        Ok(())
    }
}

mod faults {
    use super::*;

    #[test]
    fn stalled_pipeline_escalates_to_fail_safe() -> TestResult {
        let report = run(&args(&["--ticks", "10", "--stall-pipeline-at", "3"])?)?;
        // Silent for more than the audio preset's 1 s from tick 4 onwards.
        // Health checks are due at ticks 5 and 10; every other silent tick
        // is refused at the gate, and the third refusal (tick 7) latches.
        assert_eq!(report.failed_ticks, 2);
        assert_eq!(report.gate_refusals, 5);
        assert_eq!(report.frames_acknowledged, 2);
        assert!(report.safety.in_fail_safe_mode);
        assert_eq!(report.restarts, 0);
        Ok(())
    }

    #[test]
    fn per_tick_health_checks_fail_instead_of_escalating() -> TestResult {
        let config = config_file(r#"{"safety": {"health_check_interval_ms": 1000}}"#)?;
        let path = config.path().to_string_lossy().into_owned();
        let report = run(&args(&[
            "--config",
            &path,
            "--ticks",
            "10",
            "--stall-pipeline-at",
            "3",
        ])?)?;
        // A failed health check skips the gate, so nothing escalates.
        assert_eq!(report.failed_ticks, 7);
        assert_eq!(report.gate_refusals, 0);
        assert_eq!(report.safety.error_count, 7);
        assert!(!report.safety.in_fail_safe_mode);
        Ok(())
    }

    #[test]
    fn recovery_after_clearing_faults() -> TestResult {
        let report = run(&args(&[
            "--ticks",
            "12",
            "--stall-pipeline-at",
            "3",
            "--recover-at",
            "9",
        ])?)?;
        assert_eq!(report.recovery_succeeded, Some(true));
        // Health check at tick 5, gate refusals at ticks 4, 6, 7 and 8.
        assert_eq!(report.failed_ticks, 1);
        assert_eq!(report.gate_refusals, 4);
        assert!(!report.safety.in_fail_safe_mode);
        assert_eq!(report.safety.error_count, 0);
        Ok(())
    }

    #[test]
    fn low_memory_escalates_to_fail_safe() -> TestResult {
        let report = run(&args(&["--ticks", "6", "--low-memory-at", "2"])?)?;
        assert!(report.safety.in_fail_safe_mode);
        assert!(!report.safety.memory_ok);
        // Gate refusals at ticks 2, 3, 4 and 6; the health check at tick 5.
        assert_eq!(report.failed_ticks, 1);
        assert_eq!(report.gate_refusals, 4);
        Ok(())
    }

    #[test]
    fn stack_risk_latches_on_next_health_check() -> TestResult {
        let report = run(&args(&["--ticks", "5", "--stack-risk-at", "2"])?)?;
        assert!(report.safety.in_fail_safe_mode);
        assert!(!report.safety.stack_ok);
        assert_eq!(report.failed_ticks, 1);
        assert_eq!(report.gate_refusals, 0);
        Ok(())
    }

    #[test]
    fn pipeline_overflow_is_counted_not_latched() -> TestResult {
        let report = run(&args(&["--ticks", "3", "--overflow-at", "2"])?)?;
        assert_eq!(report.safety.error_count, 1);
        assert_eq!(report.failed_ticks, 0);
        assert!(!report.safety.in_fail_safe_mode);
        Ok(())
    }

    #[test]
    fn starved_software_watchdog_restarts_once() -> TestResult {
        let config = config_file(
            r#"{"safety": {"watchdog_timeout_ms": 3000, "health_check_interval_ms": 1000}}"#,
        )?;
        let path = config.path().to_string_lossy().into_owned();
        let report = run(&args(&[
            "--config",
            &path,
            "--no-hardware-watchdog",
            "--ticks",
            "6",
            "--stall-pipeline-at",
            "1",
        ])?)?;
        assert_eq!(report.restarts, 1);
        assert!(!report.safety.watchdog_active);
        Ok(())
    }
}

mod power {
    use super::*;

    #[test]
    fn idle_device_drops_to_power_save() -> TestResult {
        let config = config_file(r#"{"power": {"idle_timeout_ms": 5000, "sleep_timeout_ms": 60000}}"#)?;
        let path = config.path().to_string_lossy().into_owned();
        let report = run(&args(&["--config", &path, "--ticks", "10", "--idle-after", "2"])?)?;
        assert_eq!(report.power.current_mode, PowerMode::PowerSave);
        assert!(report.power.idle_time_ms > 0);
        assert_eq!(report.failed_ticks, 0);
        Ok(())
    }
}

mod config {
    use super::*;

    #[test]
    fn defaults_without_file() -> TestResult {
        let config = load_config(&args(&[])?)?;
        assert_eq!(config.safety.watchdog_timeout_ms, 30_000);
        assert_eq!(config.tasks.audio.stack_size, 4_096);
        Ok(())
    }

    #[test]
    fn invalid_file_is_rejected() -> TestResult {
        let config = config_file(r#"{"safety": {"watchdog_timeout_ms": 0}}"#)?;
        let path = config.path().to_string_lossy().into_owned();
        assert!(load_config(&args(&["--config", &path])?).is_err());
        assert!(run(&args(&["--config", &path])?).is_err());
        Ok(())
    }

    #[test]
    fn missing_file_is_rejected() -> TestResult {
        let result = load_config(&args(&["--config", "/nonexistent/beatguard.json"])?);
        let message = format!("{:#}", result.err().ok_or("expected an error")?);
        assert!(message.contains("/nonexistent/beatguard.json"));
        Ok(())
    }
}
