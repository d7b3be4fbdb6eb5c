/// USB Checker core -- the task pipeline behind the window.
///
/// This crate contains all business logic with zero UI dependencies.
/// Worker threads report to the UI through a text [`channel`] and a shared
/// [`progress`] value; the [`runner`] guarantees at most one task at a time.
///
/// # Modules
///
/// - [`channel`] -- Unbounded FIFO of output lines, drained by the UI.
/// - [`progress`] -- Monotonic 0..=100 progress value.
/// - [`runner`] -- Single task slot and background thread launch.
/// - [`dispatch`] -- Action → descriptor → task body table.
/// - [`validator`] -- Picker selection → drive reference.
/// - [`tasks`] -- Analyze, repair, benchmark, and backup bodies.
/// - [`platform`] -- Drive enumeration, capacity, elevation, chkdsk.
/// - [`model`] -- Drive references and size formatting.
pub mod channel;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod platform;
pub mod progress;
pub mod runner;
pub mod task;
pub mod tasks;
pub mod validator;

pub use channel::{Message, MessageChannel, MessageSender};
pub use config::{AppConfig, TaskConfig};
pub use dispatch::{Action, Dispatcher};
pub use error::{PreconditionError, BUSY_MESSAGE, RunnerError, TaskError, ValidationError};
pub use model::{DriveRef, StorageUsage};
pub use progress::Progress;
pub use runner::{SlotState, TaskHandle, TaskRunner};
pub use task::{AnalyzeMode, BackupTarget, Notice, RepairMode, TaskContext, TaskDescriptor};
pub use validator::DriveValidator;
