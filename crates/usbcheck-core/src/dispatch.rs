/// Dispatch table -- maps a user action to a task descriptor, its
/// preconditions, and the body that runs it.
///
/// Frontends never call task bodies directly. They ask the dispatcher for a
/// descriptor, run [`Dispatcher::preflight`] on the UI thread, then hand the
/// descriptor to [`Dispatcher::launch`], which looks up the body and starts
/// it through the [`TaskRunner`].
use crate::config::TaskConfig;
use crate::error::{PreconditionError, RunnerError};
use crate::model::DriveRef;
use crate::platform::{Chkdsk, RepairTool, StorageProbe, SystemStorage};
use crate::runner::{TaskHandle, TaskRunner};
use crate::task::{
    AnalyzeMode, BackupTarget, RepairMode, TaskBody, TaskContext, TaskDescriptor,
};
use crate::tasks;
use std::sync::Arc;

/// What the user asked for, before a drive is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Analyze(AnalyzeMode),
    Repair(RepairMode),
    Benchmark,
    Backup(BackupTarget),
}

impl Action {
    pub fn with_drive(self, drive: DriveRef) -> TaskDescriptor {
        match self {
            Self::Analyze(mode) => TaskDescriptor::Analyze { drive, mode },
            Self::Repair(mode) => TaskDescriptor::Repair { drive, mode },
            Self::Benchmark => TaskDescriptor::Benchmark { drive },
            Self::Backup(target) => TaskDescriptor::Backup { drive, target },
        }
    }
}

/// Collaborators and configuration shared by every task body.
#[derive(Clone)]
pub struct Dispatcher {
    config: TaskConfig,
    storage: Arc<dyn StorageProbe>,
    repair_tool: Arc<dyn RepairTool>,
}

impl Dispatcher {
    pub fn new(
        config: TaskConfig,
        storage: Arc<dyn StorageProbe>,
        repair_tool: Arc<dyn RepairTool>,
    ) -> Self {
        Self {
            config,
            storage,
            repair_tool,
        }
    }

    /// Real OS collaborators.
    pub fn system(config: TaskConfig) -> Self {
        Self::new(config, Arc::new(SystemStorage), Arc::new(Chkdsk))
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    /// Checks that must pass before a thread is spawned.
    ///
    /// The busy check is not included; it belongs to the runner.
    pub fn preflight(&self, descriptor: &TaskDescriptor) -> Result<(), PreconditionError> {
        match descriptor {
            TaskDescriptor::Benchmark { drive }
            | TaskDescriptor::Analyze {
                drive,
                mode: AnalyzeMode::Full,
            } => self.check_benchmark_space(drive),
            TaskDescriptor::Backup { drive, target } => {
                tasks::backup::check_destination(drive, target)
            }
            TaskDescriptor::Analyze { .. } | TaskDescriptor::Repair { .. } => Ok(()),
        }
    }

    /// Free space must be at least `free_space_factor` payloads.
    pub fn check_benchmark_space(&self, drive: &DriveRef) -> Result<(), PreconditionError> {
        let usage = self
            .storage
            .usage(drive.path())
            .map_err(|e| PreconditionError::SpaceCheck(e.to_string()))?;
        let required = self.config.required_free_space();
        if usage.free < required {
            return Err(PreconditionError::InsufficientSpace {
                free: usage.free,
                required,
            });
        }
        Ok(())
    }

    /// The body that implements `descriptor`.
    pub fn body(&self, descriptor: &TaskDescriptor) -> TaskBody {
        let config = self.config.clone();
        match descriptor.clone() {
            TaskDescriptor::Analyze { drive, mode } => {
                let storage = self.storage.clone();
                Box::new(move |ctx: &TaskContext| {
                    tasks::analyze::run(ctx, &drive, mode, storage.as_ref(), &config)
                })
            }
            TaskDescriptor::Repair { drive, mode } => {
                let tool = self.repair_tool.clone();
                Box::new(move |ctx: &TaskContext| {
                    tasks::repair::run(ctx, &drive, mode, tool.as_ref())
                })
            }
            TaskDescriptor::Benchmark { drive } => {
                Box::new(move |ctx: &TaskContext| tasks::benchmark::run(ctx, &drive, &config))
            }
            TaskDescriptor::Backup { drive, target } => {
                Box::new(move |ctx: &TaskContext| {
                    tasks::backup::run(ctx, &drive, &target, &config)
                })
            }
        }
    }

    /// Start `descriptor` on `runner`. Preconditions are the caller's job.
    pub fn launch(
        &self,
        runner: &TaskRunner,
        descriptor: TaskDescriptor,
    ) -> Result<TaskHandle, RunnerError> {
        let body = self.body(&descriptor);
        runner.try_start(descriptor, body)
    }
}
