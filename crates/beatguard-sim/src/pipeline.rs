//! Stand-in for the audio sampling and detection task.
//!
//! The real task samples the microphone and runs beat detection. Here it
//! consumes one frame per monitoring tick, records a fixed stack usage and
//! acknowledges the frame, which is all the safety loop observes.

use beatguard_errors::{ErrorCode, ErrorSeverity};
use beatguard_safety::ErrorReporter;
use beatguard_tasks::{SchedulerResult, TaskContext, TaskHandle, TaskKind, TaskManager, TaskResult};
use crossbeam::channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};
use portable_atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Frames buffered between the monitoring loop and the pipeline.
pub const FRAME_QUEUE_DEPTH: usize = 4;

/// Stack bytes the pipeline reports per processed frame.
pub const FRAME_STACK_USAGE: u32 = 1_536;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// One unit of work for the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Monitoring tick that produced the frame.
    pub tick: u64,
    /// Report a sample buffer overflow while processing.
    pub inject_overflow: bool,
}

/// Shared switch that stalls the pipeline.
#[derive(Debug, Clone, Default)]
pub struct PipelineControl {
    stalled: Arc<AtomicBool>,
}

impl PipelineControl {
    /// Stall or resume frame processing.
    pub fn set_stalled(&self, stalled: bool) {
        self.stalled.store(stalled, Ordering::Release);
    }

    /// Whether frames are being swallowed.
    #[must_use]
    pub fn is_stalled(&self) -> bool {
        self.stalled.load(Ordering::Acquire)
    }
}

/// Running pipeline task and its channels.
#[derive(Debug)]
pub struct Pipeline<'s> {
    handle: TaskHandle<'s>,
    frames: Sender<Frame>,
    acks: Receiver<u64>,
    control: PipelineControl,
}

impl<'s> Pipeline<'s> {
    /// Start the pipeline from the audio preset.
    ///
    /// # Errors
    ///
    /// Returns an error if the task cannot be created.
    pub fn spawn(tasks: &TaskManager<'s>, reporter: ErrorReporter) -> TaskResult<Self> {
        let config = tasks.preset(TaskKind::Audio);
        let (frames, frame_rx) = bounded(FRAME_QUEUE_DEPTH);
        let (ack_tx, acks) = bounded(FRAME_QUEUE_DEPTH);
        let control = PipelineControl::default();
        let task_control = control.clone();

        let handle = tasks.create_task(&config, move |ctx| {
            process_frames(&ctx, &frame_rx, &ack_tx, &reporter, &task_control);
        })?;

        Ok(Self {
            handle,
            frames,
            acks,
            control,
        })
    }

    /// Queue a frame. Returns `false` if the queue is full or the task is
    /// gone.
    pub fn submit(&self, frame: Frame) -> bool {
        self.frames.try_send(frame).is_ok()
    }

    /// Wait up to `timeout` for an acknowledgement, then take any others
    /// already queued. Returns the latest acknowledged tick.
    pub fn wait_for_ack(&self, timeout: Duration) -> Option<u64> {
        let first = self.acks.recv_timeout(timeout).ok()?;
        Some(self.acks.try_iter().fold(first, u64::max))
    }

    /// Fault-injection switch.
    #[must_use]
    pub fn control(&self) -> &PipelineControl {
        &self.control
    }

    /// Task handle.
    #[must_use]
    pub fn handle(&self) -> &TaskHandle<'s> {
        &self.handle
    }

    /// Close the frame queue, stop the task and wait for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the task panicked.
    pub fn shutdown(self) -> SchedulerResult<()> {
        let Self { handle, frames, .. } = self;
        drop(frames);
        handle.stop_and_join()
    }
}

fn process_frames(
    ctx: &TaskContext,
    frames: &Receiver<Frame>,
    acks: &Sender<u64>,
    reporter: &ErrorReporter,
    control: &PipelineControl,
) {
    let mut processed: u64 = 0;
    while !ctx.should_stop() {
        let frame = match frames.recv_timeout(POLL_INTERVAL) {
            Ok(frame) => frame,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        if control.is_stalled() {
            continue;
        }
        if frame.inject_overflow
            && !reporter.report_error(
                ErrorCode::SignalBufferOverflow,
                ErrorSeverity::Error,
                "Sample buffer overflow",
            )
        {
            tracing::warn!(
                tick = frame.tick,
                dropped = reporter.monitor().dropped_reports(),
                "overflow report dropped"
            );
        }
        ctx.record_stack_usage(FRAME_STACK_USAGE);
        processed = processed.saturating_add(1);
        if let Err(TrySendError::Disconnected(_)) = acks.try_send(frame.tick) {
            break;
        }
    }
    tracing::debug!(task = ctx.name(), processed, "detection pipeline stopped");
}
