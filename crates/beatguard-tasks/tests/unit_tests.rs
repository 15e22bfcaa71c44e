//! Integration tests for task creation and handles.

#![cfg(test)]

use beatguard_tasks::prelude::*;
use beatguard_tasks::{SchedulerResult, TaskBody};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc;
use std::time::Duration;

fn wait_for_stop(ctx: &TaskContext) {
    while !ctx.should_stop() {
        std::thread::sleep(Duration::from_millis(1));
    }
}

mod creation {
    use super::*;

    #[test]
    fn test_closure_task_runs() -> Result<(), Box<dyn std::error::Error>> {
        let scheduler = ThreadScheduler::new();
        let tasks = TaskManager::new(&scheduler);
        let (tx, rx) = mpsc::channel();

        let handle = tasks.create_task(&tasks.preset(TaskKind::Audio), move |ctx| {
            let _ = tx.send(ctx.name().to_string());
        })?;
        assert_eq!(rx.recv_timeout(Duration::from_secs(5))?, "AudioSampling");
        assert_eq!(handle.name(), "AudioSampling");
        handle.join()?;
        Ok(())
    }

    #[test]
    fn test_function_pointer_task_receives_parameter() -> Result<(), Box<dyn std::error::Error>> {
        fn worker(counter: Arc<AtomicU32>, _ctx: TaskContext) {
            counter.fetch_add(7, Ordering::SeqCst);
        }

        let scheduler = ThreadScheduler::new();
        let tasks = TaskManager::new(&scheduler);
        let counter = Arc::new(AtomicU32::new(0));

        let handle = tasks.create_task_fn(
            &TaskConfig::new("worker"),
            worker,
            Arc::clone(&counter),
        )?;
        handle.join()?;
        assert_eq!(counter.load(Ordering::SeqCst), 7);
        Ok(())
    }

    #[test]
    fn test_invalid_config_never_reaches_scheduler() {
        let scheduler = ThreadScheduler::new();
        let tasks = TaskManager::new(&scheduler);
        let result = tasks.create_task(&TaskConfig::new("tiny").with_stack_size(16), |_| {});
        assert!(matches!(result, Err(TaskError::InsufficientMemory { requested: 16 })));
        assert_eq!(tasks.task_stats().total_tasks, 0);
    }

    #[derive(Debug)]
    struct RefusingScheduler;

    impl Scheduler for RefusingScheduler {
        fn spawn(&self, config: &TaskConfig, _body: TaskBody) -> SchedulerResult<TaskId> {
            Err(SchedulerError::Spawn {
                name: config.name.to_string(),
                reason: "out of task control blocks".into(),
            })
        }
        fn request_stop(&self, _id: TaskId) {}
        fn release(&self, _id: TaskId) {}
        fn join(&self, id: TaskId) -> SchedulerResult<()> {
            Err(SchedulerError::UnknownTask(id.0))
        }
        fn state(&self, _id: TaskId) -> Option<TaskState> {
            None
        }
        fn stack_high_water_mark(&self, _id: TaskId) -> Option<u32> {
            None
        }
        fn task_name(&self, _id: TaskId) -> Option<String> {
            None
        }
        fn stats(&self) -> TaskStats {
            TaskStats::default()
        }
    }

    #[test]
    fn test_failed_creation_drops_closure() {
        let scheduler = RefusingScheduler;
        let tasks = TaskManager::new(&scheduler);
        let captured = Arc::new(());
        let inner = Arc::clone(&captured);

        let result = tasks.create_task(&TaskConfig::new("doomed"), move |_| drop(inner));
        assert!(matches!(result, Err(TaskError::CreationFailed(_))));
        assert_eq!(Arc::strong_count(&captured), 1);
    }
}

mod handles {
    use super::*;

    #[test]
    fn test_drop_requests_stop() -> Result<(), Box<dyn std::error::Error>> {
        let scheduler = ThreadScheduler::new();
        let tasks = TaskManager::new(&scheduler);
        let (tx, rx) = mpsc::channel();

        let handle = tasks.create_task(&TaskConfig::new("looper"), move |ctx| {
            wait_for_stop(&ctx);
            let _ = tx.send(());
        })?;
        drop(handle);
        rx.recv_timeout(Duration::from_secs(5))?;
        Ok(())
    }

    #[test]
    fn test_detach_keeps_task_running() -> Result<(), Box<dyn std::error::Error>> {
        let scheduler = ThreadScheduler::new();
        let tasks = TaskManager::new(&scheduler);
        let (go_tx, go_rx) = mpsc::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel();

        let handle = tasks.create_task(&TaskConfig::new("detached"), move |ctx| {
            let _ = go_rx.recv();
            let _ = done_tx.send(ctx.should_stop());
        })?;
        assert!(handle.detach().is_some());

        go_tx.send(())?;
        assert!(!done_rx.recv_timeout(Duration::from_secs(5))?);
        Ok(())
    }

    #[test]
    fn test_stop_and_join() -> Result<(), Box<dyn std::error::Error>> {
        let scheduler = ThreadScheduler::new();
        let tasks = TaskManager::new(&scheduler);

        let handle = tasks.create_task(&TaskConfig::new("joined"), |ctx| wait_for_stop(&ctx))?;
        assert!(handle.is_valid());
        handle.stop_and_join()?;
        assert_eq!(tasks.task_stats().total_tasks, 0);
        Ok(())
    }

    #[test]
    fn test_panicking_task_reports_on_join() -> Result<(), Box<dyn std::error::Error>> {
        let scheduler = ThreadScheduler::new();
        let tasks = TaskManager::new(&scheduler);

        let handle = tasks.create_task(&TaskConfig::new("faulty"), |_| {
            panic!("sensor read failed");
        })?;
        assert!(matches!(handle.join(), Err(SchedulerError::Panicked(name)) if name == "faulty"));
        Ok(())
    }
}

mod health {
    use super::*;

    #[test]
    fn test_stack_usage_drives_health() -> Result<(), Box<dyn std::error::Error>> {
        let scheduler = ThreadScheduler::new();
        let tasks = TaskManager::new(&scheduler);
        let (used_tx, used_rx) = mpsc::channel();
        let (usage_tx, usage_rx) = mpsc::channel::<u32>();

        let config = TaskConfig::new("deep").with_stack_size(4096);
        let handle = tasks.create_task(&config, move |ctx| {
            while let Ok(bytes) = usage_rx.recv() {
                ctx.record_stack_usage(bytes);
                let _ = used_tx.send(());
            }
        })?;

        usage_tx.send(1024)?;
        used_rx.recv_timeout(Duration::from_secs(5))?;
        assert_eq!(tasks.stack_high_water_mark(&handle), Some(3072));
        assert!(tasks.is_task_healthy(&handle));

        usage_tx.send(3800)?;
        used_rx.recv_timeout(Duration::from_secs(5))?;
        assert_eq!(tasks.stack_high_water_mark(&handle), Some(296));
        assert!(!tasks.is_task_healthy(&handle));

        drop(usage_tx);
        handle.join()?;
        Ok(())
    }

    #[test]
    fn test_stats_count_running_tasks() -> Result<(), Box<dyn std::error::Error>> {
        let scheduler = ThreadScheduler::new();
        let tasks = TaskManager::new(&scheduler);
        let (ready_tx, ready_rx) = mpsc::channel();

        let mut handles = Vec::new();
        for name in ["a", "b", "c"] {
            let tx = ready_tx.clone();
            handles.push(tasks.create_task(&TaskConfig::new(name), move |ctx| {
                let _ = tx.send(());
                wait_for_stop(&ctx);
            })?);
        }
        for _ in 0..3 {
            ready_rx.recv_timeout(Duration::from_secs(5))?;
        }

        let stats = tasks.task_stats();
        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.running_tasks, 3);

        for handle in handles {
            handle.stop_and_join()?;
        }
        assert_eq!(tasks.task_stats().total_tasks, 0);
        Ok(())
    }

    #[test]
    fn test_recommended_stack_sizes() {
        let scheduler = ThreadScheduler::new();
        let tasks = TaskManager::new(&scheduler);
        assert_eq!(tasks.recommended_stack_size(TaskKind::Audio), 4096);
        assert_eq!(tasks.recommended_stack_size(TaskKind::Network), 8192);
        assert_eq!(tasks.recommended_stack_size(TaskKind::Monitoring), 4096);
        assert_eq!(tasks.recommended_stack_size(TaskKind::Background), 3072);
        assert_eq!(tasks.recommended_stack_size_for("display"), 4096);
    }
}

mod presets {
    use super::*;

    #[test]
    fn test_presets_json_override() -> Result<(), Box<dyn std::error::Error>> {
        let presets: TaskPresets = serde_json::from_str(
            r#"{"audio": {"name": "Sampler", "stack_size": 6144, "priority": "critical",
                          "core_affinity": 1, "watchdog_timeout_ms": 500}}"#,
        )?;
        assert_eq!(presets.audio.name, "Sampler");
        assert_eq!(presets.audio.priority, TaskPriority::Critical);
        assert_eq!(presets.audio.core_affinity, CoreAffinity::CORE0);
        assert_eq!(presets.network.stack_size, 8192);
        presets.validate()?;
        Ok(())
    }
}
