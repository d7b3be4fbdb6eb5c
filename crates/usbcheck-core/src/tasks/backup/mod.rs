/// Full-drive backup: directory mirror or ZIP archive.
///
/// Both variants enumerate the drive once up front, then process the
/// resulting list. A file that cannot be copied is logged and skipped; the
/// backup still completes.
mod archive;
mod mirror;
pub mod walk;

pub use archive::entry_name;
pub use walk::{enumerate, is_reserved, Inventory, SourceFile};

use crate::config::TaskConfig;
use crate::error::PreconditionError;
use crate::model::size::{format_count, format_size};
use crate::model::DriveRef;
use crate::task::{BackupTarget, Notice, TaskContext};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Counts from a finished backup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupSummary {
    /// Files written to the destination.
    pub files: u64,
    /// Original bytes of those files.
    pub bytes: u64,
    /// Files skipped because of an error.
    pub failed: u64,
    /// Entries the walk could not read.
    pub unreadable: u64,
    /// Archive size on disk, for the archive variant.
    pub compressed: Option<u64>,
}

/// Space saved by compression, in percent. Zero for an empty source.
pub fn compression_ratio(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        0.0
    } else {
        (1.0 - compressed as f64 / original as f64) * 100.0
    }
}

/// Reject a mirror destination that lives on the drive being copied.
pub fn check_destination(
    drive: &DriveRef,
    target: &BackupTarget,
) -> Result<(), PreconditionError> {
    let BackupTarget::Mirror(dest) = target else {
        return Ok(());
    };
    let dest = canonical(dest);
    if dest.starts_with(canonical(drive.path())) {
        return Err(PreconditionError::DestinationInsideSource(dest));
    }
    Ok(())
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Backup task body.
pub fn run(
    ctx: &TaskContext,
    drive: &DriveRef,
    target: &BackupTarget,
    config: &TaskConfig,
) -> anyhow::Result<()> {
    ctx.say("Starting backup...\n");

    let skip = match target {
        BackupTarget::Archive(path) => Some(path.as_path()),
        BackupTarget::Mirror(_) => None,
    };
    let inventory = enumerate(drive.path(), skip);
    if inventory.is_empty() {
        ctx.say("No files found to backup.\n");
        return Ok(());
    }
    ctx.say(format!(
        "Found {} files ({}).\n",
        format_count(inventory.file_count()),
        format_size(inventory.total_bytes)
    ));

    let mut summary = match target {
        BackupTarget::Mirror(dest) => mirror::run(ctx, &inventory, dest, config),
        BackupTarget::Archive(path) => archive::run(ctx, &inventory, path, config)?,
    };
    summary.unreadable = inventory.unreadable;

    ctx.progress().finish();
    ctx.say(summary_text(&summary, target));
    info!(
        "Backed up {drive} to {} - {} files, {} failed, {} unreadable",
        target.path().display(),
        summary.files,
        summary.failed,
        summary.unreadable
    );
    ctx.announce(Notice::new(
        "Backup Complete",
        format!(
            "Successfully backed up {} files.",
            format_count(summary.files)
        ),
    ));
    Ok(())
}

fn summary_text(summary: &BackupSummary, target: &BackupTarget) -> String {
    let mut text = match (target, summary.compressed) {
        (BackupTarget::Archive(path), Some(compressed)) => format!(
            "\nBackup completed: {} files archived.\nOriginal size: {}\nCompressed size: {}\nCompression ratio: {:.1}%\nArchive: {}\n",
            format_count(summary.files),
            format_size(summary.bytes),
            format_size(compressed),
            compression_ratio(summary.bytes, compressed),
            path.display()
        ),
        _ => format!(
            "\nBackup completed: {} files copied ({}).\n",
            format_count(summary.files),
            format_size(summary.bytes)
        ),
    };
    if summary.failed > 0 {
        text.push_str(&format!(
            "Skipped {} files that could not be backed up (see log).\n",
            format_count(summary.failed)
        ));
    }
    if summary.unreadable > 0 {
        text.push_str(&format!(
            "Skipped {} unreadable entries.\n",
            format_count(summary.unreadable)
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_compression_ratio() {
        assert_eq!(compression_ratio(0, 0), 0.0);
        assert_eq!(compression_ratio(0, 22), 0.0);
        assert!((compression_ratio(1_000, 250) - 75.0).abs() < 1e-9);
        assert!(compression_ratio(100, 120) < 0.0);
    }

    #[test]
    fn test_destination_inside_source_rejected() {
        let tmp = TempDir::new().unwrap();
        let inner = tmp.path().join("backup");
        fs::create_dir_all(&inner).unwrap();
        let drive = DriveRef::new(tmp.path(), "STICK", "vfat");

        let err = check_destination(&drive, &BackupTarget::Mirror(inner)).unwrap_err();
        assert!(matches!(err, PreconditionError::DestinationInsideSource(_)));

        let elsewhere = TempDir::new().unwrap();
        assert!(check_destination(&drive, &BackupTarget::Mirror(elsewhere.path().into())).is_ok());
        assert!(check_destination(
            &drive,
            &BackupTarget::Archive(tmp.path().join("b.zip"))
        )
        .is_ok());
    }

    #[test]
    fn test_summary_text_variants() {
        let s = BackupSummary {
            files: 3,
            bytes: 1_000,
            failed: 0,
            unreadable: 0,
            compressed: None,
        };
        assert_eq!(
            summary_text(&s, &BackupTarget::Mirror("/x".into())),
            "\nBackup completed: 3 files copied (1000 B).\n"
        );

        let s = BackupSummary {
            compressed: Some(250),
            ..s
        };
        let text = summary_text(&s, &BackupTarget::Archive("/x/b.zip".into()));
        assert!(text.contains("Compression ratio: 75.0%"));
        assert!(text.contains("3 files archived"));
        assert!(!text.contains("Skipped"));
    }

    #[test]
    fn test_summary_text_reports_skips() {
        let s = BackupSummary {
            files: 1_250,
            bytes: 4_096,
            failed: 2,
            unreadable: 1,
            compressed: None,
        };
        assert_eq!(
            summary_text(&s, &BackupTarget::Mirror("/x".into())),
            "\nBackup completed: 1,250 files copied (4.0 KB).\n\
             Skipped 2 files that could not be backed up (see log).\n\
             Skipped 1 unreadable entries.\n"
        );
    }
}
