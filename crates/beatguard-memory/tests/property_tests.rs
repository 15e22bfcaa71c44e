//! Property-based tests for buffer and container invariants.

#![cfg(test)]

use beatguard_memory::prelude::*;
use beatguard_platform::HostPlatform;
use proptest::prelude::*;

fn alignment_strategy() -> impl Strategy<Value = usize> {
    (2u32..8).prop_map(|shift| 1usize << shift)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_buffer_is_aligned_and_sized(
        count in 1usize..2048,
        alignment in alignment_strategy(),
    ) {
        let buffer = AlignedBuffer::<f32>::new(count, alignment);
        prop_assert!(buffer.is_valid());
        prop_assert_eq!(buffer.len(), count);
        prop_assert_eq!(buffer.as_slice().len(), count);
        prop_assert_eq!(buffer.as_slice().as_ptr().align_offset(alignment), 0);
    }

    #[test]
    fn prop_take_leaves_source_empty(
        count in 1usize..512,
        alignment in alignment_strategy(),
        takes in 1usize..4,
    ) {
        let mut source = AlignedBuffer::<u32>::new(count, alignment);
        let moved = source.take();
        prop_assert_eq!(moved.len(), count);
        for _ in 0..takes {
            let again = source.take();
            prop_assert!(!again.is_valid());
            prop_assert_eq!(source.len(), 0);
        }
        drop(source);
        drop(moved);
    }

    #[test]
    fn prop_safe_vector_never_exceeds_capacity(
        capacity in 0usize..64,
        pushes in 0usize..128,
    ) {
        let mut v = SafeVector::with_capacity(capacity);
        let mut accepted = 0usize;
        for i in 0..pushes {
            if v.push(i) {
                accepted += 1;
            }
        }
        prop_assert_eq!(accepted, pushes.min(capacity));
        prop_assert!(v.len() <= v.capacity());
        prop_assert_eq!(v.is_full(), pushes >= capacity);
    }

    #[test]
    fn prop_fragmentation_in_unit_range(
        free in 0u32..1_000_000,
        largest in proptest::option::of(0u32..2_000_000),
    ) {
        let platform = HostPlatform::builder().total_heap(1_000_000).free_heap(free).build();
        platform.set_largest_free_block(largest);
        let monitor = MemoryMonitor::new(&platform);
        let f = monitor.fragmentation();
        prop_assert!((0.0..=1.0).contains(&f));
    }

    #[test]
    fn prop_peak_is_max_usage(
        readings in proptest::collection::vec(0u32..100_000, 1..30),
    ) {
        let platform = HostPlatform::builder().total_heap(100_000).build();
        let monitor = MemoryMonitor::new(&platform);
        let mut worst = 0u32;
        for free in readings {
            platform.set_free_heap(free);
            let _ = monitor.free_heap();
            worst = worst.max(100_000 - free);
        }
        prop_assert_eq!(monitor.peak_usage(), worst);
    }
}
