/// Application state management.
///
/// Centralises all mutable state that the UI reads and writes. Worker
/// threads talk back only through the core [`MessageChannel`] and the shared
/// [`Progress`](usbcheck_core::Progress) value; `process_messages()` drains
/// the channel once per frame.
///
/// Every button goes through [`AppState::request`], which applies the same
/// order of checks: busy slot, drive validation, task-specific preconditions,
/// optional confirmation, and finally the launch.
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use usbcheck_core::platform::list_removable_drives;
use usbcheck_core::{
    Action, AnalyzeMode, AppConfig, BackupTarget, Dispatcher, DriveRef, DriveValidator,
    MessageChannel, Notice, PreconditionError, Progress, RepairMode, RunnerError, SlotState,
    TaskDescriptor, TaskHandle, TaskRunner,
};

pub use usbcheck_core::BUSY_MESSAGE;

/// A modal dialog waiting for the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    Warning { title: String, text: String },
    Info { title: String, text: String },
    /// Yes/No question; `Yes` launches `descriptor`.
    Confirm {
        title: String,
        text: String,
        descriptor: TaskDescriptor,
    },
}

impl Dialog {
    fn warning(title: &str, text: impl Into<String>) -> Self {
        Self::Warning {
            title: title.to_string(),
            text: text.into(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Warning { title, .. }
            | Self::Info { title, .. }
            | Self::Confirm { title, .. } => title,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Warning { text, .. } | Self::Info { text, .. } | Self::Confirm { text, .. } => {
                text
            }
        }
    }
}

/// All application state.
pub struct AppState {
    pub config: AppConfig,

    // ── Drives ─────────────────────────────────────────
    pub drives: Vec<DriveRef>,
    validator: DriveValidator,
    /// Picker text of the selected drive; empty when nothing is selected.
    pub selection: String,

    // ── Task pipeline ──────────────────────────────────
    channel: MessageChannel,
    runner: TaskRunner,
    dispatcher: Dispatcher,
    task: Option<TaskHandle>,

    // ── Output ─────────────────────────────────────────
    output: VecDeque<String>,

    // ── UI state ───────────────────────────────────────
    pub dialog: Option<Dialog>,
    pub analyze_with_speed: bool,
    pub repair_mode: RepairMode,
    pub backup_as_archive: bool,
}

impl AppState {
    /// State wired to the real platform collaborators.
    pub fn new(config: AppConfig) -> Self {
        let dispatcher = Dispatcher::system(config.tasks.clone());
        let mut state = Self::with_dispatcher(config, dispatcher);
        state.refresh_drives();
        state
    }

    /// State with an explicit dispatcher and no drives loaded.
    pub fn with_dispatcher(config: AppConfig, dispatcher: Dispatcher) -> Self {
        let channel = MessageChannel::new();
        let runner = TaskRunner::new(channel.sender(), Progress::new());
        Self {
            config,
            drives: Vec::new(),
            validator: DriveValidator::new(),
            selection: String::new(),
            channel,
            runner,
            dispatcher,
            task: None,
            output: VecDeque::new(),
            dialog: None,
            analyze_with_speed: true,
            repair_mode: RepairMode::Quick,
            backup_as_archive: false,
        }
    }

    // ── Drives ─────────────────────────────────────────

    /// Re-enumerate removable drives.
    pub fn refresh_drives(&mut self) {
        self.set_drives(list_removable_drives());
    }

    /// Replace the drive list, rebuild the picker mapping, select the first.
    pub fn set_drives(&mut self, drives: Vec<DriveRef>) {
        self.validator.refresh(drives.clone());
        self.drives = drives;
        self.selection = self
            .validator
            .selections()
            .first()
            .cloned()
            .unwrap_or_default();
        if self.drives.is_empty() {
            self.push_output("No USB drives found.");
        }
    }

    pub fn selections(&self) -> &[String] {
        self.validator.selections()
    }

    // ── Requests ───────────────────────────────────────

    /// Handle a button press for `action` against the selected drive.
    pub fn request(&mut self, action: Action) {
        let Some(drive) = self.checked_drive() else {
            return;
        };
        let descriptor = action.with_drive(drive.clone());

        match &descriptor {
            TaskDescriptor::Repair { mode, .. } => {
                self.dialog = Some(Dialog::Confirm {
                    title: "Confirm Repair".to_string(),
                    text: format!(
                        "Do you want to repair drive {}?\n{}",
                        drive.path().display(),
                        mode.duration_hint()
                    ),
                    descriptor,
                });
            }
            TaskDescriptor::Analyze {
                mode: AnalyzeMode::Full,
                ..
            } => match self.dispatcher.preflight(&descriptor) {
                Ok(()) => self.start(descriptor),
                Err(PreconditionError::InsufficientSpace { .. }) => {
                    self.dialog = Some(Dialog::Confirm {
                        title: "Insufficient Space".to_string(),
                        text: "Not enough free space for a speed test.\n\
                               Run storage analysis only?"
                            .to_string(),
                        descriptor: Action::Analyze(AnalyzeMode::StorageOnly).with_drive(drive),
                    });
                }
                Err(err) => self.dialog = Some(Dialog::warning("Analysis", err.to_string())),
            },
            TaskDescriptor::Benchmark { .. } => match self.dispatcher.preflight(&descriptor) {
                Ok(()) => {
                    self.push_output("Starting benchmark... This may take a few moments.");
                    self.start(descriptor);
                }
                Err(err) => {
                    self.dialog = Some(Dialog::warning("Insufficient Space", err.to_string()))
                }
            },
            _ => match self.dispatcher.preflight(&descriptor) {
                Ok(()) => self.start(descriptor),
                Err(err) => self.dialog = Some(Dialog::warning("Warning", err.to_string())),
            },
        }
    }

    /// Backup request. `choose` is asked for a destination only after the
    /// busy and validation checks pass; `None` means the user cancelled.
    pub fn request_backup(&mut self, choose: impl FnOnce(&DriveRef, bool) -> Option<PathBuf>) {
        let Some(drive) = self.checked_drive() else {
            return;
        };
        let Some(dest) = choose(&drive, self.backup_as_archive) else {
            tracing::debug!("Backup of {drive} cancelled at destination chooser");
            return;
        };
        let target = if self.backup_as_archive {
            BackupTarget::Archive(dest)
        } else {
            BackupTarget::Mirror(dest)
        };
        self.request(Action::Backup(target));
    }

    /// Resolve the user's answer to the open dialog.
    pub fn answer_dialog(&mut self, yes: bool) {
        if let Some(Dialog::Confirm { descriptor, .. }) = self.dialog.take() {
            if yes {
                self.start(descriptor);
            }
        }
    }

    pub fn dismiss_dialog(&mut self) {
        self.dialog = None;
    }

    /// Busy check then validation. Failures are reported and yield `None`.
    fn checked_drive(&mut self) -> Option<DriveRef> {
        if self.is_busy() {
            self.push_output(BUSY_MESSAGE);
            return None;
        }
        match self.validator.validate(&self.selection) {
            Ok(drive) => Some(drive),
            Err(err) => {
                tracing::debug!("Validation failed for {:?}: {err}", self.selection);
                self.dialog = Some(Dialog::warning("Error", err.to_string()));
                None
            }
        }
    }

    fn start(&mut self, descriptor: TaskDescriptor) {
        match self.dispatcher.launch(&self.runner, descriptor) {
            Ok(handle) => self.task = Some(handle),
            Err(RunnerError::Busy) => self.push_output(BUSY_MESSAGE),
            Err(err) => {
                tracing::error!("Could not start task: {err}");
                self.dialog = Some(Dialog::warning("Error", err.to_string()));
            }
        }
    }

    // ── Per-frame processing ───────────────────────────

    /// Drain pending worker messages into the output buffer and retire the
    /// task handle once its thread has exited.
    ///
    /// Returns `true` if anything changed.
    pub fn process_messages(&mut self) -> bool {
        let mut changed = self.drain();

        if self.task.as_ref().is_some_and(TaskHandle::is_finished) {
            if let Some(handle) = self.task.take() {
                tracing::debug!("Retiring task handle: {}", handle.label());
                if let Some(Notice { title, text }) = handle.join() {
                    // An open dialog wins; the summary is in the output anyway.
                    if self.dialog.is_none() {
                        self.dialog = Some(Dialog::Info { title, text });
                    }
                }
            }
            // The thread has exited; whatever it sent is already queued.
            changed |= self.drain();
        }
        changed
    }

    fn drain(&mut self) -> bool {
        let messages = self.channel.drain_all();
        for message in &messages {
            self.push_output(message);
        }
        !messages.is_empty()
    }

    pub fn is_busy(&self) -> bool {
        self.runner.is_busy()
    }

    /// A task thread is still outstanding (running, or finished but not yet
    /// retired by `process_messages`).
    pub fn has_task(&self) -> bool {
        self.task.is_some()
    }

    pub fn progress(&self) -> f32 {
        self.runner.progress().fraction()
    }

    /// Status-bar text for the current slot.
    pub fn status_text(&self) -> String {
        match self.runner.state() {
            SlotState::Running(descriptor) => format!("{descriptor}..."),
            SlotState::Idle => "Ready".to_string(),
        }
    }

    // ── Output ─────────────────────────────────────────

    /// Append a message, one entry per line, trimming to the configured cap.
    pub fn push_output(&mut self, message: &str) {
        let body = message.strip_suffix('\n').unwrap_or(message);
        for line in body.split('\n') {
            self.output.push_back(line.trim_end_matches('\r').to_string());
        }
        let cap = self.config.max_output_lines.max(1);
        while self.output.len() > cap {
            self.output.pop_front();
        }
    }

    pub fn output_lines(&self) -> impl ExactSizeIterator<Item = &str> {
        self.output.iter().map(String::as_str)
    }

    pub fn output_text(&self) -> String {
        self.output.iter().fold(String::new(), |mut acc, line| {
            acc.push_str(line);
            acc.push('\n');
            acc
        })
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    // ── Log file ───────────────────────────────────────

    pub fn log_path(&self) -> PathBuf {
        PathBuf::from(&self.config.log_file)
    }

    /// Open the persistent log with the OS handler.
    pub fn open_log_file(&mut self) {
        let path = self.log_path();
        if !path.exists() {
            self.dialog = Some(Dialog::Info {
                title: "Log File".to_string(),
                text: "Log file not found.".to_string(),
            });
            return;
        }
        if let Err(e) = open_with_os(&path) {
            tracing::warn!("Could not open {}: {e}", path.display());
            self.dialog = Some(Dialog::warning(
                "Log File",
                format!("Could not open log file: {e}"),
            ));
        }
    }
}

fn open_with_os(path: &Path) -> std::io::Result<()> {
    let program = if cfg!(windows) {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };
    std::process::Command::new(program).arg(path).spawn().map(|_| ())
}
