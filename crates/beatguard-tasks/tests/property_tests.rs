//! Property-based tests for task configuration.

#![cfg(test)]

use beatguard_tasks::prelude::*;
use beatguard_tasks::{MAX_STACK_SIZE, MIN_STACK_SIZE};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_stack_range_validation(stack in any::<u32>(), affinity in 1u8..=3) {
        let config = TaskConfig::new("unit")
            .with_stack_size(stack)
            .with_core_affinity(CoreAffinity::from_bits_truncate(affinity));
        let in_range = (MIN_STACK_SIZE..=MAX_STACK_SIZE).contains(&stack);
        prop_assert_eq!(config.validate().is_ok(), in_range);
    }

    #[test]
    fn prop_affinity_json_is_the_bitmask(bits in 1u8..=3) {
        let affinity = CoreAffinity::from_bits_truncate(bits);
        let json = serde_json::to_string(&affinity).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(json, bits.to_string());
    }
}
