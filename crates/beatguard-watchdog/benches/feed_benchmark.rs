//! Benchmarks for the watchdog feed path.

use beatguard_memory::MemoryMonitor;
use beatguard_platform::{HostPlatform, ManualTimer, TracingLogger};
use beatguard_watchdog::prelude::*;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

fn bench_feed(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed");

    for (name, hardware) in [("hardware", true), ("software", false)] {
        let platform = HostPlatform::builder().with_watchdog(hardware).build();
        let timer = ManualTimer::new();
        let logger = TracingLogger::new();
        let memory = MemoryMonitor::new(&platform);
        let Ok(device) = WatchdogFactory::create(&platform, &timer, DEFAULT_TIMEOUT_MS) else {
            continue;
        };
        let mut manager = WatchdogManager::new(device, &memory, &logger);

        group.bench_function(name, |b| {
            b.iter(|| manager.feed());
        });
    }

    group.finish();
}

fn bench_health_gate(c: &mut Criterion) {
    let platform = HostPlatform::new();
    let timer = ManualTimer::new();
    let logger = TracingLogger::new();
    let memory = MemoryMonitor::new(&platform);
    let Ok(device) = WatchdogFactory::create(&platform, &timer, DEFAULT_TIMEOUT_MS) else {
        return;
    };
    let mut manager = WatchdogManager::new(device, &memory, &logger);
    manager.register_health_check(Arc::new(|| true));

    c.bench_function("check_health_and_feed", |b| {
        b.iter(|| black_box(manager.check_health_and_feed()));
    });

    c.bench_function("critical_section_guard", |b| {
        b.iter(|| {
            let guard = CriticalSectionGuard::new(&mut manager);
            black_box(guard.consecutive_failures())
        });
    });
}

criterion_group!(benches, bench_feed, bench_health_gate);
criterion_main!(benches);
