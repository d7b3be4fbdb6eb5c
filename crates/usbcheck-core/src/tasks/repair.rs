/// Filesystem repair through the native disk-check tool.
///
/// Output is forwarded line by line while the tool runs. Progress is a
/// heuristic driven by output volume: quick mode prints a little and
/// finishes in minutes, deep mode prints a lot over hours, so deep mode
/// moves the bar more slowly and stops it closer to the end.
use crate::error::TaskError;
use crate::model::DriveRef;
use crate::platform::RepairTool;
use crate::progress::Progress;
use crate::task::{RepairMode, TaskContext};
use anyhow::Context;
use std::io::BufRead;
use std::path::Path;
use tracing::{info, warn};

/// How output lines translate to progress for one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineProgress {
    /// Added once per `every` non-empty lines.
    pub step: u8,
    pub every: u64,
    /// The estimate never passes this; exit sets 100.
    pub ceiling: u8,
}

impl LineProgress {
    pub fn for_mode(mode: RepairMode) -> Self {
        match mode {
            RepairMode::Quick => Self {
                step: 5,
                every: 1,
                ceiling: 90,
            },
            RepairMode::Deep => Self {
                step: 1,
                every: 10,
                ceiling: 95,
            },
        }
    }

    /// Account for the `line_no`-th non-empty line (1-based).
    pub fn on_line(&self, line_no: u64, progress: &Progress) {
        if line_no % self.every == 0 {
            progress.advance(self.step, self.ceiling);
        }
    }
}

/// Drive letter for a Windows-style root such as `E:\`.
pub fn drive_letter(path: &Path) -> Result<char, TaskError> {
    let text = path.to_string_lossy();
    let first = text
        .trim_end_matches(['\\', '/'])
        .chars()
        .next()
        .ok_or_else(|| TaskError::InvalidDriveLetter(String::new()))?;
    if first.is_ascii_alphabetic() {
        Ok(first.to_ascii_uppercase())
    } else {
        Err(TaskError::InvalidDriveLetter(first.to_string()))
    }
}

/// Repair task body.
pub fn run(
    ctx: &TaskContext,
    drive: &DriveRef,
    mode: RepairMode,
    tool: &dyn RepairTool,
) -> anyhow::Result<()> {
    if !tool.is_supported() {
        return Err(TaskError::RepairUnsupported.into());
    }
    if !tool.has_elevated_privileges() {
        return Err(TaskError::NotElevated.into());
    }

    let letter = drive_letter(drive.path())?;
    ctx.say(format!(
        "Running chkdsk on {letter}: ({} repair)...\n",
        mode.label()
    ));

    let mut process = tool
        .launch(letter, mode)
        .context("failed to start chkdsk")?;

    let policy = LineProgress::for_mode(mode);
    let mut line_no: u64 = 0;
    let mut raw = Vec::with_capacity(256);
    loop {
        raw.clear();
        let n = process
            .stdout
            .read_until(b'\n', &mut raw)
            .context("reading chkdsk output failed")?;
        if n == 0 {
            break;
        }
        // chkdsk writes in the OEM code page; keep whatever decodes.
        let line = String::from_utf8_lossy(&raw);
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }
        line_no += 1;
        ctx.say(format!("{line}\n"));
        policy.on_line(line_no, ctx.progress());
    }

    let exit = process.wait().context("waiting for chkdsk failed")?;
    if exit.code == 0 {
        ctx.say("\nRepair completed successfully.\n");
    } else {
        // chkdsk uses non-zero codes both for "fixed" and "found but not
        // fixed", so this is reported, not failed.
        warn!("chkdsk on {letter}: exited with code {}", exit.code);
        ctx.say(format!(
            "\nRepair completed with warnings (exit code {}).\n{}\n",
            exit.code,
            exit.stderr.trim_end()
        ));
    }
    ctx.progress().finish();
    info!("Repaired drive: {drive} ({} mode, {line_no} lines)", mode.label());
    Ok(())
}
