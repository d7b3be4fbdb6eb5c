/// The native disk-check tool, seen as a child process.
///
/// The repair task only needs three things from it: a line stream on
/// stdout while it runs, then an exit code and whatever it wrote to stderr.
/// [`RepairProcess`] packages exactly that so tests can substitute a
/// scripted process.
use crate::task::RepairMode;
use std::io::{self, BufRead};

/// Outcome of a finished repair process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairExit {
    pub code: i32,
    pub stderr: String,
}

type Waiter = Box<dyn FnOnce() -> io::Result<RepairExit> + Send>;

/// A running repair process.
pub struct RepairProcess {
    /// Standard output, read line by line by the repair task.
    pub stdout: Box<dyn BufRead + Send>,
    waiter: Waiter,
}

impl RepairProcess {
    pub fn new(
        stdout: Box<dyn BufRead + Send>,
        waiter: impl FnOnce() -> io::Result<RepairExit> + Send + 'static,
    ) -> Self {
        Self {
            stdout,
            waiter: Box::new(waiter),
        }
    }

    /// Wait for exit and collect stderr.
    pub fn wait(self) -> io::Result<RepairExit> {
        (self.waiter)()
    }
}

/// A platform disk-repair utility.
pub trait RepairTool: Send + Sync {
    /// Whether this platform has the tool at all.
    fn is_supported(&self) -> bool;

    /// Whether the process may run the tool. Checked once per repair.
    fn has_elevated_privileges(&self) -> bool {
        crate::platform::is_elevated()
    }

    /// Start the tool against `letter:` in the given mode.
    fn launch(&self, letter: char, mode: RepairMode) -> io::Result<RepairProcess>;
}

/// Command-line flags for a repair mode.
pub fn chkdsk_flags(mode: RepairMode) -> &'static [&'static str] {
    match mode {
        RepairMode::Quick => &["/f"],
        RepairMode::Deep => &["/f", "/r"],
    }
}

/// `chkdsk.exe` from the Windows system directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct Chkdsk;

impl RepairTool for Chkdsk {
    fn is_supported(&self) -> bool {
        cfg!(windows)
    }

    #[cfg(windows)]
    fn launch(&self, letter: char, mode: RepairMode) -> io::Result<RepairProcess> {
        use std::io::{BufReader, Read};
        use std::os::windows::process::CommandExt;
        use std::path::PathBuf;
        use std::process::{Command, Stdio};

        const CREATE_NO_WINDOW: u32 = 0x0800_0000;

        let system_root = std::env::var("SystemRoot").unwrap_or_else(|_| "C:\\Windows".to_string());
        let exe = PathBuf::from(system_root).join("System32").join("chkdsk.exe");

        let mut child = Command::new(&exe)
            .arg(format!("{letter}:"))
            .args(chkdsk_flags(mode))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .creation_flags(CREATE_NO_WINDOW)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("chkdsk stdout was not captured"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("chkdsk stderr was not captured"))?;

        // Drain stderr alongside stdout so a chatty tool cannot fill the pipe
        // and stall; the text is only handed over after exit.
        let stderr_reader = std::thread::Builder::new()
            .name("usbcheck-chkdsk-stderr".into())
            .spawn(move || {
                let mut buf = Vec::new();
                let _ = stderr.read_to_end(&mut buf);
                String::from_utf8_lossy(&buf).into_owned()
            })?;

        Ok(RepairProcess::new(
            Box::new(BufReader::new(stdout)),
            move || {
                let status = child.wait()?;
                let stderr = stderr_reader.join().unwrap_or_default();
                Ok(RepairExit {
                    code: status.code().unwrap_or(-1),
                    stderr,
                })
            },
        ))
    }

    #[cfg(not(windows))]
    fn launch(&self, _letter: char, _mode: RepairMode) -> io::Result<RepairProcess> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "chkdsk is only available on Windows",
        ))
    }
}
