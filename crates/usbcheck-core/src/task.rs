/// Task descriptors and the context handed to a running task body.
use crate::channel::{Message, MessageSender};
use crate::model::DriveRef;
use crate::progress::Progress;
use parking_lot::Mutex;
use std::fmt;
use std::path::PathBuf;

/// How thorough an analysis is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzeMode {
    /// Capacity figures only.
    StorageOnly,
    /// Capacity plus a write/read speed measurement and a tier rating.
    Full,
}

/// Repair depth for the native disk-check tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairMode {
    /// Fix filesystem errors. Minutes.
    Quick,
    /// Fix filesystem errors and scan for bad sectors. Hours.
    Deep,
}

impl RepairMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Deep => "deep",
        }
    }

    /// Rough duration hint for confirmation prompts.
    pub fn duration_hint(self) -> &'static str {
        match self {
            Self::Quick => "This may take several minutes.",
            Self::Deep => "A deep scan checks every sector and may take several hours.",
        }
    }
}

/// Where a backup goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupTarget {
    /// Copy the tree into this directory.
    Mirror(PathBuf),
    /// Write a single ZIP archive at this path.
    Archive(PathBuf),
}

impl BackupTarget {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Mirror(p) | Self::Archive(p) => p,
        }
    }
}

/// One unit of work, owned by the thread that executes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskDescriptor {
    Analyze { drive: DriveRef, mode: AnalyzeMode },
    Repair { drive: DriveRef, mode: RepairMode },
    Benchmark { drive: DriveRef },
    Backup { drive: DriveRef, target: BackupTarget },
}

impl TaskDescriptor {
    pub fn drive(&self) -> &DriveRef {
        match self {
            Self::Analyze { drive, .. }
            | Self::Repair { drive, .. }
            | Self::Benchmark { drive }
            | Self::Backup { drive, .. } => drive,
        }
    }

    /// Lower-case noun used in "Error during ..." lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Analyze { .. } => "analysis",
            Self::Repair { .. } => "repair",
            Self::Benchmark { .. } => "benchmark",
            Self::Backup { .. } => "backup",
        }
    }
}

impl fmt::Display for TaskDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analyze {
                drive,
                mode: AnalyzeMode::StorageOnly,
            } => write!(f, "Storage analysis of {drive}"),
            Self::Analyze { drive, .. } => write!(f, "Full analysis of {drive}"),
            Self::Repair { drive, mode } => {
                write!(f, "{} repair of {drive}", capitalise(mode.label()))
            }
            Self::Benchmark { drive } => write!(f, "Benchmark of {drive}"),
            Self::Backup {
                drive,
                target: BackupTarget::Mirror(_),
            } => write!(f, "Folder backup of {drive}"),
            Self::Backup { drive, .. } => write!(f, "ZIP backup of {drive}"),
        }
    }
}

fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Body of a task. Runs once on the worker thread.
pub type TaskBody = Box<dyn FnOnce(&TaskContext) -> anyhow::Result<()> + Send + 'static>;

/// Headline result of a successful task, shown to the user as a dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub text: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }
}

/// What a task body can touch: the output channel, the progress value, and
/// the notice slot.
pub struct TaskContext {
    messages: MessageSender,
    progress: Progress,
    notice: Mutex<Option<Notice>>,
}

impl TaskContext {
    pub fn new(messages: MessageSender, progress: Progress) -> Self {
        Self {
            messages,
            progress,
            notice: Mutex::new(None),
        }
    }

    /// Emit a line to the output and the persistent log.
    pub fn say(&self, text: impl Into<Message>) {
        let text = text.into();
        tracing::info!(target: "usbcheck::task", "{}", text.trim_end());
        self.messages.send(text);
    }

    /// Emit a progress chatter line; logged at debug only.
    pub fn note(&self, text: impl Into<Message>) {
        let text = text.into();
        tracing::debug!(target: "usbcheck::task", "{}", text.trim_end());
        self.messages.send(text);
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Leave a notice for the frontend. Delivered only if the body then
    /// returns `Ok`; a later call replaces an earlier one.
    pub fn announce(&self, notice: Notice) {
        *self.notice.lock() = Some(notice);
    }

    /// Take the pending notice, if any.
    pub fn take_notice(&self) -> Option<Notice> {
        self.notice.lock().take()
    }

    pub(crate) fn sender(&self) -> &MessageSender {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_and_display() {
        let drive = DriveRef::new("/media/usb0", "STICK", "vfat");
        let repair = TaskDescriptor::Repair {
            drive: drive.clone(),
            mode: RepairMode::Deep,
        };
        assert_eq!(repair.label(), "repair");
        assert_eq!(repair.to_string(), "Deep repair of /media/usb0");
        assert_eq!(repair.drive(), &drive);

        let backup = TaskDescriptor::Backup {
            drive,
            target: BackupTarget::Archive(PathBuf::from("/tmp/b.zip")),
        };
        assert_eq!(backup.label(), "backup");
        assert_eq!(backup.to_string(), "ZIP backup of /media/usb0");
    }

    #[test]
    fn test_notice_taken_once() {
        let channel = crate::channel::MessageChannel::new();
        let ctx = TaskContext::new(channel.sender(), Progress::new());
        assert_eq!(ctx.take_notice(), None);

        ctx.announce(Notice::new("First", "one"));
        ctx.announce(Notice::new("Second", "two"));
        assert_eq!(ctx.take_notice(), Some(Notice::new("Second", "two")));
        assert_eq!(ctx.take_notice(), None);
    }
}
