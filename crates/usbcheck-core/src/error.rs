/// Error taxonomy for the task pipeline.
///
/// Validation and precondition errors are raised on the UI thread before any
/// worker exists and are shown as warnings. `TaskError` values are returned
/// from inside a task body and end up as a single text line in the output,
/// the same as any other task-fatal error.
use std::path::PathBuf;
use thiserror::Error;

/// Reported when a task is requested while another one holds the slot.
pub const BUSY_MESSAGE: &str = "Another operation is already running.";

/// A drive selection could not be resolved to a usable device.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a valid USB drive.")]
    NoSelection,
    #[error("Invalid drive selection.")]
    UnknownSelection,
    #[error("The drive {} is not available.", .0.display())]
    Unavailable(PathBuf),
}

/// A task could not be started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("Not enough free space on the drive ({free} bytes free, {required} required).")]
    InsufficientSpace { free: u64, required: u64 },
    #[error("The backup destination {} is inside the drive being backed up.", .0.display())]
    DestinationInsideSource(PathBuf),
    #[error("Failed to check drive space: {0}")]
    SpaceCheck(String),
}

/// Task-fatal conditions detected by a task body.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Repair function is only available on Windows.")]
    RepairUnsupported,
    #[error("Administrator privileges required for repair.")]
    NotElevated,
    #[error("Invalid drive letter: {0}")]
    InvalidDriveLetter(String),
}

/// The task runner could not launch a body.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{}", BUSY_MESSAGE)]
    Busy,
    #[error("failed to spawn task thread: {0}")]
    Spawn(#[from] std::io::Error),
}
