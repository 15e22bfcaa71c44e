//! Integration tests for the watchdog manager and guards.

#![cfg(test)]

use beatguard_memory::MemoryMonitor;
use beatguard_platform::LogLevel;
use beatguard_test_helpers::prelude::*;
use beatguard_watchdog::prelude::*;

mod escalation {
    use super::*;

    #[test]
    fn test_single_success_does_not_exit_fail_safe() -> Result<(), Box<dyn std::error::Error>> {
        let fx = SafetyFixture::new();
        let memory = MemoryMonitor::new(&fx.platform);
        let device = WatchdogFactory::create(&fx.platform, &fx.timer, 10_000)?;
        let mut manager = WatchdogManager::new(device, &memory, &fx.logger);
        let switch = HealthSwitch::new(false);
        manager.register_health_check(switch.check());

        for _ in 0..MAX_CONSECUTIVE_FAILURES {
            assert!(!manager.check_health_and_feed());
        }
        assert!(manager.is_in_fail_safe_mode());

        switch.set(true);
        assert!(manager.check_health_and_feed());
        assert!(manager.is_in_fail_safe_mode());
        assert_eq!(manager.consecutive_failures(), 0);
        Ok(())
    }

    #[test]
    fn test_interleaved_success_resets_counter() -> Result<(), Box<dyn std::error::Error>> {
        let fx = SafetyFixture::new();
        let memory = MemoryMonitor::new(&fx.platform);
        let device = WatchdogFactory::create(&fx.platform, &fx.timer, 10_000)?;
        let mut manager = WatchdogManager::new(device, &memory, &fx.logger);
        let switch = HealthSwitch::new(false);
        manager.register_health_check(switch.check());

        for _ in 0..5 {
            switch.set(false);
            let _ = manager.check_health_and_feed();
            let _ = manager.check_health_and_feed();
            switch.set(true);
            let _ = manager.check_health_and_feed();
        }
        assert!(!manager.is_in_fail_safe_mode());
        Ok(())
    }

    #[test]
    fn test_custom_threshold() -> Result<(), Box<dyn std::error::Error>> {
        let fx = SafetyFixture::new();
        let memory = MemoryMonitor::new(&fx.platform);
        let device = WatchdogFactory::create(&fx.platform, &fx.timer, 10_000)?;
        let mut manager =
            WatchdogManager::new(device, &memory, &fx.logger).with_max_consecutive_failures(1);
        manager.register_health_check(HealthSwitch::new(false).check());
        let _ = manager.check_health_and_feed();
        assert!(manager.is_in_fail_safe_mode());
        Ok(())
    }
}

mod recovery_gate {
    use super::*;

    #[test]
    fn test_refusals_do_not_mutate() -> Result<(), Box<dyn std::error::Error>> {
        let fx = SafetyFixture::new();
        let memory = MemoryMonitor::new(&fx.platform);
        let device = WatchdogFactory::create(&fx.platform, &fx.timer, 10_000)?;
        let mut manager = WatchdogManager::new(device, &memory, &fx.logger);
        let switch = HealthSwitch::new(false);
        manager.register_health_check(switch.check());
        for _ in 0..MAX_CONSECUTIVE_FAILURES {
            let _ = manager.check_health_and_feed();
        }

        let before = (manager.status(), manager.metrics());
        for _ in 0..5 {
            assert!(!manager.attempt_recovery());
        }
        assert_eq!((manager.status(), manager.metrics()), before);
        Ok(())
    }

    #[test]
    fn test_recovers_once_when_healthy() -> Result<(), Box<dyn std::error::Error>> {
        let fx = SafetyFixture::new();
        let memory = MemoryMonitor::new(&fx.platform);
        let device = WatchdogFactory::create(&fx.platform, &fx.timer, 10_000)?;
        let mut manager = WatchdogManager::new(device, &memory, &fx.logger);
        let switch = HealthSwitch::new(false);
        manager.register_health_check(switch.check());
        for _ in 0..MAX_CONSECUTIVE_FAILURES {
            let _ = manager.check_health_and_feed();
        }

        switch.set(true);
        assert!(manager.check_health_and_feed());
        assert!(manager.attempt_recovery());
        assert!(!manager.is_in_fail_safe_mode());
        assert!(manager.attempt_recovery());
        assert_eq!(manager.metrics().recoveries, 1);
        assert_eq!(fx.logger.count_containing("Recovered from fail-safe mode"), 1);
        Ok(())
    }

    #[test]
    fn test_low_memory_blocks_recovery() -> Result<(), Box<dyn std::error::Error>> {
        let fx = SafetyFixture::new();
        let memory = MemoryMonitor::new(&fx.platform);
        let device = WatchdogFactory::create(&fx.platform, &fx.timer, 10_000)?;
        let mut manager = WatchdogManager::new(device, &memory, &fx.logger);
        manager.enter_fail_safe_mode();
        fx.platform.set_free_heap(100);
        assert!(!manager.attempt_recovery());
        fx.platform.set_free_heap(HEALTHY_FREE_HEAP);
        assert!(manager.attempt_recovery());
        Ok(())
    }
}

mod critical_sections {
    use super::*;

    fn nested_with_early_return(manager: &mut WatchdogManager<'_>, bail: bool) -> Option<()> {
        let mut outer = CriticalSectionGuard::new(manager);
        {
            let _inner = CriticalSectionGuard::new(&mut outer);
            if bail {
                return None;
            }
        }
        outer.refresh();
        Some(())
    }

    #[test]
    fn test_nested_guards_feed_at_least_twice() -> Result<(), Box<dyn std::error::Error>> {
        let fx = SafetyFixture::new();
        let memory = MemoryMonitor::new(&fx.platform);
        let device = WatchdogFactory::create(&fx.platform, &fx.timer, 1_000)?;
        let mut manager = WatchdogManager::new(device, &memory, &fx.logger);

        assert_eq!(nested_with_early_return(&mut manager, false), Some(()));
        assert!(manager.metrics().feed_count >= 2);
        Ok(())
    }

    #[test]
    fn test_inner_early_return_still_feeds() -> Result<(), Box<dyn std::error::Error>> {
        let fx = SafetyFixture::new();
        let memory = MemoryMonitor::new(&fx.platform);
        let device = WatchdogFactory::create(&fx.platform, &fx.timer, 1_000)?;
        let mut manager = WatchdogManager::new(device, &memory, &fx.logger);

        fx.timer.advance_ms(900);
        assert_eq!(nested_with_early_return(&mut manager, true), None);
        assert_eq!(manager.metrics().feed_count, 4);
        assert_eq!(manager.status().time_remaining_ms, 1_000);
        Ok(())
    }
}

mod software_fallback {
    use super::*;

    #[test]
    fn test_manager_polls_software_device() -> Result<(), Box<dyn std::error::Error>> {
        let fx = SafetyFixture::without_hardware_watchdog();
        let memory = MemoryMonitor::new(&fx.platform);
        let device = WatchdogFactory::create(&fx.platform, &fx.timer, 500)?;
        let mut manager = WatchdogManager::new(device, &memory, &fx.logger);
        assert_eq!(manager.status().kind, WatchdogKind::Software);

        fx.timer.advance_ms(499);
        assert!(!manager.poll());
        fx.timer.advance_ms(1);
        assert_eq!(manager.status().state, WatchdogState::Starved);
        assert!(manager.poll());
        assert_eq!(fx.platform.restart_count(), 1);
        assert_eq!(manager.status().state, WatchdogState::Reset);
        Ok(())
    }

    #[test]
    fn test_status_serializes() -> Result<(), Box<dyn std::error::Error>> {
        let fx = SafetyFixture::without_hardware_watchdog();
        let memory = MemoryMonitor::new(&fx.platform);
        let device = WatchdogFactory::create(&fx.platform, &fx.timer, 500)?;
        let manager = WatchdogManager::new(device, &memory, &fx.logger);
        let json = serde_json::to_value(manager.status())?;
        assert_eq!(json["kind"], "Software");
        assert_eq!(json["time_remaining_ms"], 500);
        assert!(!fx.logger.at_level(LogLevel::Info).is_empty());
        Ok(())
    }
}
