//! Property-based tests for watchdog timing and escalation.

#![cfg(test)]

use beatguard_memory::MemoryMonitor;
use beatguard_platform::{HostPlatform, ManualTimer};
use beatguard_test_helpers::prelude::*;
use beatguard_watchdog::prelude::*;
use proptest::prelude::*;

fn device<'a>(
    platform: &'a HostPlatform,
    timer: &'a ManualTimer,
    timeout_ms: u32,
    hardware: bool,
) -> WatchdogResult<WatchdogDevice<'a>> {
    if hardware {
        WatchdogFactory::create_hardware(platform, timer, timeout_ms)
    } else {
        WatchdogFactory::create_software(platform, timer, timeout_ms)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_remaining_time_counts_down_and_floors(
        timeout_ms in 1u32..100_000,
        elapsed in 0u64..200_000,
        hardware in any::<bool>(),
    ) {
        let platform = HostPlatform::new();
        let timer = ManualTimer::new();
        let mut wdt = device(&platform, &timer, timeout_ms, hardware).map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert!(wdt.feed().is_ok());
        prop_assert_eq!(wdt.time_remaining_ms(), timeout_ms);

        timer.advance_ms(elapsed);
        let expected = u64::from(timeout_ms).saturating_sub(elapsed);
        prop_assert_eq!(u64::from(wdt.time_remaining_ms()), expected);
    }

    #[test]
    fn prop_remaining_is_monotonic_between_feeds(
        timeout_ms in 1u32..10_000,
        steps in proptest::collection::vec(0u64..500, 1..40),
        hardware in any::<bool>(),
    ) {
        let platform = HostPlatform::new();
        let timer = ManualTimer::new();
        let wdt = device(&platform, &timer, timeout_ms, hardware).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let mut last = wdt.time_remaining_ms();
        for step in steps {
            timer.advance_ms(step);
            let now = wdt.time_remaining_ms();
            prop_assert!(now <= last);
            last = now;
        }
    }

    #[test]
    fn prop_fail_safe_iff_failure_run_reaches_threshold(
        results in proptest::collection::vec(any::<bool>(), 1..40),
    ) {
        let fx = SafetyFixture::new();
        let memory = MemoryMonitor::new(&fx.platform);
        let dev = WatchdogFactory::create(&fx.platform, &fx.timer, 10_000).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let mut manager = WatchdogManager::new(dev, &memory, &fx.logger);
        let switch = HealthSwitch::new(true);
        manager.register_health_check(switch.check());

        let mut run = 0u32;
        let mut expect_latched = false;
        for healthy in results {
            switch.set(healthy);
            let passed = manager.check_health_and_feed();
            prop_assert_eq!(passed, healthy);
            run = if healthy { 0 } else { run + 1 };
            expect_latched |= run >= MAX_CONSECUTIVE_FAILURES;
            prop_assert_eq!(manager.consecutive_failures(), run);
        }
        prop_assert_eq!(manager.is_in_fail_safe_mode(), expect_latched);
    }
}
