//! Integration tests for the power manager.

#![cfg(test)]

use beatguard_platform::{HostPlatform, ManualTimer, Platform};
use beatguard_power::prelude::*;

fn config(idle_ms: u64, sleep_ms: u64) -> Result<PowerConfig, PowerError> {
    PowerConfig::builder()
        .idle_timeout_ms(idle_ms)
        .sleep_timeout_ms(sleep_ms)
        .build()
}

mod construction {
    use super::*;

    #[test]
    fn test_default_mode_applied_on_creation() -> Result<(), Box<dyn std::error::Error>> {
        let timer = ManualTimer::new();
        let platform = HostPlatform::new();
        let power = PowerManager::new(&timer, &platform, PowerConfig::default())?;

        assert_eq!(power.current_power_mode(), PowerMode::Balanced);
        assert_eq!(power.current_activity(), ActivityLevel::Moderate);
        assert_eq!(platform.cpu_frequency_mhz(), 160);
        assert!(platform.peripheral_power_down());
        assert!(!platform.radio_power_save());
        Ok(())
    }

    #[test]
    fn test_invalid_config_rejected() {
        let timer = ManualTimer::new();
        let platform = HostPlatform::new();
        let bad = PowerConfig {
            idle_timeout_ms: 0,
            ..PowerConfig::default()
        };
        assert!(PowerManager::new(&timer, &platform, bad).is_err());
    }
}

mod activity {
    use super::*;

    #[test]
    fn test_activity_selects_mode() -> Result<(), Box<dyn std::error::Error>> {
        let timer = ManualTimer::new();
        let platform = HostPlatform::new();
        let mut power = PowerManager::new(&timer, &platform, PowerConfig::default())?;

        power.update_activity(ActivityLevel::Critical);
        assert_eq!(power.current_power_mode(), PowerMode::Performance);
        assert_eq!(platform.cpu_frequency_mhz(), 240);
        assert!(!platform.peripheral_power_down());

        power.update_activity(ActivityLevel::Low);
        assert_eq!(power.current_power_mode(), PowerMode::PowerSave);
        assert_eq!(platform.cpu_frequency_mhz(), 80);
        assert!(platform.radio_power_save());
        Ok(())
    }

    #[test]
    fn test_static_frequency_ignores_activity() -> Result<(), Box<dyn std::error::Error>> {
        let timer = ManualTimer::new();
        let platform = HostPlatform::new();
        let cfg = PowerConfig::builder().dynamic_frequency(false).build()?;
        let mut power = PowerManager::new(&timer, &platform, cfg)?;

        power.update_activity(ActivityLevel::Critical);
        assert_eq!(power.current_power_mode(), PowerMode::Balanced);
        assert_eq!(power.current_activity(), ActivityLevel::Critical);
        Ok(())
    }

    #[test]
    fn test_radio_knob_untouched_when_disabled() -> Result<(), Box<dyn std::error::Error>> {
        let timer = ManualTimer::new();
        let platform = HostPlatform::new();
        let cfg = PowerConfig::builder()
            .radio_power_management(false)
            .peripheral_powerdown(false)
            .build()?;
        let mut power = PowerManager::new(&timer, &platform, cfg)?;

        power.set_power_mode(PowerMode::UltraLowPower);
        assert_eq!(platform.cpu_frequency_mhz(), 40);
        assert!(!platform.radio_power_save());
        assert!(!platform.peripheral_power_down());
        assert!(!power.power_stats().radio_power_save);
        Ok(())
    }
}

mod idle {
    use super::*;

    #[test]
    fn test_idle_timeout_forces_power_save() -> Result<(), Box<dyn std::error::Error>> {
        let timer = ManualTimer::new();
        let platform = HostPlatform::new();
        let mut power = PowerManager::new(&timer, &platform, config(1_000, 5_000)?)?;
        power.update_activity(ActivityLevel::High);

        timer.advance_ms(1_000);
        power.execute_power_management();
        assert_eq!(power.current_power_mode(), PowerMode::Performance);
        assert!(!power.should_enter_low_power_mode());

        timer.advance_ms(1);
        assert!(power.should_enter_low_power_mode());
        power.execute_power_management();
        assert_eq!(power.current_power_mode(), PowerMode::PowerSave);
        assert_eq!(platform.cpu_frequency_mhz(), 80);
        Ok(())
    }

    #[test]
    fn test_activity_before_timeout_restarts_idle_clock() -> Result<(), Box<dyn std::error::Error>> {
        let timer = ManualTimer::new();
        let platform = HostPlatform::new();
        let mut power = PowerManager::new(&timer, &platform, config(1_000, 5_000)?)?;
        power.update_activity(ActivityLevel::High);

        timer.advance_ms(800);
        power.execute_power_management();
        power.update_activity(ActivityLevel::High);

        // Past the first deadline, inside the second.
        timer.advance_ms(800);
        power.execute_power_management();
        assert_eq!(power.current_power_mode(), PowerMode::Performance);

        timer.advance_ms(201);
        power.execute_power_management();
        assert_eq!(power.current_power_mode(), PowerMode::PowerSave);
        Ok(())
    }

    #[test]
    fn test_idle_rule_keeps_ultra_low_power() -> Result<(), Box<dyn std::error::Error>> {
        let timer = ManualTimer::new();
        let platform = HostPlatform::new();
        let mut power = PowerManager::new(&timer, &platform, config(1_000, 5_000)?)?;
        power.set_power_mode(PowerMode::UltraLowPower);

        timer.advance_ms(2_000);
        power.execute_power_management();
        assert_eq!(power.current_power_mode(), PowerMode::UltraLowPower);
        Ok(())
    }

    #[test]
    fn test_idle_time_accumulates_once_per_interval() -> Result<(), Box<dyn std::error::Error>> {
        let timer = ManualTimer::new();
        let platform = HostPlatform::new();
        let mut power = PowerManager::new(&timer, &platform, config(1_000, 5_000)?)?;

        timer.advance_ms(1_500);
        power.execute_power_management();
        assert_eq!(power.power_stats().idle_time_ms, 1_500);

        timer.advance_ms(500);
        power.execute_power_management();
        assert_eq!(power.power_stats().idle_time_ms, 2_000);

        power.wake_up();
        timer.advance_ms(500);
        power.execute_power_management();
        assert_eq!(power.power_stats().idle_time_ms, 2_000);
        Ok(())
    }

    #[test]
    fn test_sleep_advice_and_accounting() -> Result<(), Box<dyn std::error::Error>> {
        let timer = ManualTimer::new();
        let platform = HostPlatform::new();
        let mut power = PowerManager::new(&timer, &platform, config(1_000, 5_000)?)?;

        timer.advance_ms(5_001);
        assert!(power.should_enter_sleep());
        power.force_sleep(250);
        power.force_sleep(250);
        assert_eq!(platform.slept_ms(), 500);
        assert_eq!(power.power_stats().sleep_time_ms, 500);

        power.wake_up();
        assert!(!power.should_enter_sleep());
        assert!(!power.should_enter_low_power_mode());
        Ok(())
    }
}

mod stats {
    use super::*;

    #[test]
    fn test_stats_snapshot() -> Result<(), Box<dyn std::error::Error>> {
        let timer = ManualTimer::starting_at_ms(10_000);
        let platform = HostPlatform::new();
        let mut power = PowerManager::new(&timer, &platform, PowerConfig::default())?;
        power.update_activity(ActivityLevel::Idle);
        timer.advance_ms(4_000);

        let stats = power.power_stats();
        assert_eq!(stats.uptime_ms, 4_000);
        assert_eq!(stats.current_mode, PowerMode::PowerSave);
        assert_eq!(stats.current_activity, ActivityLevel::Idle);
        assert_eq!(stats.cpu_frequency_mhz, 80);
        assert!(stats.radio_power_save);
        assert!(stats.average_power_ma.abs() < f32::EPSILON);

        let json = serde_json::to_value(stats)?;
        assert_eq!(json["current_mode"], "power_save");
        Ok(())
    }
}
