/// Directory-mirror backup.
use super::walk::{Inventory, SourceFile};
use super::BackupSummary;
use crate::config::TaskConfig;
use crate::model::size::format_count;
use crate::progress::percent_of;
use crate::task::TaskContext;
use anyhow::Context;
use filetime::FileTime;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Copy every inventoried file under `dest`, preserving relative paths.
pub(super) fn run(
    ctx: &TaskContext,
    inventory: &Inventory,
    dest: &Path,
    config: &TaskConfig,
) -> BackupSummary {
    let total = inventory.file_count();
    let every = config.mirror_report_every.max(1);
    let mut summary = BackupSummary::default();

    for file in &inventory.files {
        match copy_file(file, dest) {
            Ok(bytes) => {
                summary.files += 1;
                summary.bytes += bytes;
                ctx.progress().set(percent_of(summary.files, total, 100));
                if summary.files % every == 0 {
                    ctx.note(format!(
                        "Copied {}/{} files...\n",
                        format_count(summary.files),
                        format_count(total)
                    ));
                }
            }
            Err(err) => {
                summary.failed += 1;
                warn!("Failed to copy {}: {err:#}", file.path.display());
            }
        }
    }
    summary
}

fn copy_file(file: &SourceFile, dest: &Path) -> anyhow::Result<u64> {
    let target = dest.join(&file.relative);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let bytes = fs::copy(&file.path, &target)?;

    // Keep the original modification time; a failure here is cosmetic.
    match fs::metadata(&file.path) {
        Ok(meta) => {
            let mtime = FileTime::from_last_modification_time(&meta);
            if let Err(err) = filetime::set_file_mtime(&target, mtime) {
                debug!("Could not set mtime on {}: {err}", target.display());
            }
        }
        Err(err) => debug!("Could not stat {}: {err}", file.path.display()),
    }
    Ok(bytes)
}
