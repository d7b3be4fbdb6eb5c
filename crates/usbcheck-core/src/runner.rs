/// Task runner -- the single task slot.
///
/// At most one task body runs at a time. [`TaskRunner::try_start`] flips the
/// slot from `Idle` to `Running` under one lock, resets the progress value,
/// and launches the body on a named background thread. The thread releases
/// the slot through a drop guard, so the slot is freed and progress forced to
/// 100 whether the body returns `Ok`, returns `Err`, or panics.
use crate::channel::MessageSender;
use crate::error::RunnerError;
use crate::progress::Progress;
use crate::task::{Notice, TaskBody, TaskContext, TaskDescriptor};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, info};

/// State of the task slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SlotState {
    #[default]
    Idle,
    Running(TaskDescriptor),
}

type Slot = Arc<Mutex<SlotState>>;

/// Handle to a launched task.
///
/// The owner keeps it until [`TaskHandle::is_finished`] turns true. There is
/// deliberately no cancel method: a running task always runs to completion.
pub struct TaskHandle {
    label: String,
    thread: JoinHandle<Option<Notice>>,
}

impl TaskHandle {
    /// Human-readable description of the task, e.g. "Benchmark of E:\".
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Block until the worker thread exits and return the notice left by a
    /// successful body.
    pub fn join(self) -> Option<Notice> {
        self.thread.join().ok().flatten()
    }
}

/// Owner of the task slot, the progress sink, and a producer for the
/// message channel.
#[derive(Clone)]
pub struct TaskRunner {
    slot: Slot,
    messages: MessageSender,
    progress: Progress,
}

impl TaskRunner {
    pub fn new(messages: MessageSender, progress: Progress) -> Self {
        Self {
            slot: Arc::new(Mutex::new(SlotState::Idle)),
            messages,
            progress,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(*self.slot.lock(), SlotState::Running(_))
    }

    /// Snapshot of the slot.
    pub fn state(&self) -> SlotState {
        self.slot.lock().clone()
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Launch `body` for `descriptor` unless another task holds the slot.
    pub fn try_start(
        &self,
        descriptor: TaskDescriptor,
        body: TaskBody,
    ) -> Result<TaskHandle, RunnerError> {
        {
            let mut slot = self.slot.lock();
            if let SlotState::Running(current) = &*slot {
                info!("Rejected {descriptor}: {current} is still running");
                return Err(RunnerError::Busy);
            }
            *slot = SlotState::Running(descriptor.clone());
        }
        self.progress.reset();

        let label = descriptor.to_string();
        let guard = SlotGuard {
            slot: self.slot.clone(),
            progress: self.progress.clone(),
        };
        let ctx = TaskContext::new(self.messages.clone(), self.progress.clone());
        let task_name = descriptor.label();

        let spawned = thread::Builder::new()
            .name(format!("usbcheck-{task_name}"))
            .spawn(move || {
                // Declared first so it drops last, after any error line is sent.
                let _guard = guard;
                info!("Task started: {descriptor}");
                match panic::catch_unwind(AssertUnwindSafe(|| body(&ctx))) {
                    Ok(Ok(())) => {
                        info!("Task finished: {descriptor}");
                        ctx.take_notice()
                    }
                    Ok(Err(err)) => {
                        error!("Error during {task_name}: {err:#}");
                        ctx.sender().send(format!("Error during {task_name}: {err:#}\n"));
                        None
                    }
                    Err(payload) => {
                        let reason = panic_message(payload.as_ref());
                        error!("Task panicked during {task_name}: {reason}");
                        ctx.sender().send(format!("Error during {task_name}: {reason}\n"));
                        None
                    }
                }
            });

        match spawned {
            Ok(thread) => Ok(TaskHandle { label, thread }),
            // The closure (and its guard) was dropped by the failed spawn,
            // which has already released the slot.
            Err(err) => Err(RunnerError::Spawn(err)),
        }
    }
}

/// Frees the slot and marks progress complete when the worker exits.
struct SlotGuard {
    slot: Slot,
    progress: Progress,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.progress.finish();
        *self.slot.lock() = SlotState::Idle;
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected internal fault".to_string()
    }
}
