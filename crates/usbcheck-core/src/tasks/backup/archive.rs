/// ZIP-archive backup.
///
/// Every file becomes a Deflate entry named by its forward-slash path
/// relative to the drive root. Progress follows bytes rather than files,
/// since compression time tracks bytes, and is held at 99 until the central
/// directory has been written.
use super::walk::{Inventory, SourceFile};
use super::BackupSummary;
use crate::config::TaskConfig;
use crate::model::size::{format_count, format_size};
use crate::progress::percent_of;
use crate::task::TaskContext;
use anyhow::Context;
use std::fs::{self, File};
use std::io::{self, BufWriter, Seek, Write};
use std::path::{Component, Path};
use std::time::SystemTime;
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Progress ceiling while entries are still being written.
const WRITING_CEILING: u8 = 99;

/// Entry name inside the archive.
pub fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

pub(super) fn run(
    ctx: &TaskContext,
    inventory: &Inventory,
    archive_path: &Path,
    config: &TaskConfig,
) -> anyhow::Result<BackupSummary> {
    if let Some(parent) = archive_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let file = File::create(archive_path)
        .with_context(|| format!("cannot create archive {}", archive_path.display()))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));

    let total_files = inventory.file_count();
    let total_bytes = inventory.total_bytes;
    let every = config.archive_report_every.max(1);
    let mut summary = BackupSummary::default();
    let mut bytes_seen: u64 = 0;

    for source in &inventory.files {
        match add_entry(&mut zip, source) {
            Ok(bytes) => {
                summary.files += 1;
                summary.bytes += bytes;
            }
            Err(err) => {
                summary.failed += 1;
                warn!("Failed to archive {}: {err:#}", source.path.display());
            }
        }
        bytes_seen += source.size;
        ctx.progress()
            .set(percent_of(bytes_seen, total_bytes, WRITING_CEILING));

        let processed = summary.files + summary.failed;
        if processed % every == 0 {
            ctx.note(format!(
                "Archived {}/{} files ({} of {})...\n",
                format_count(summary.files),
                format_count(total_files),
                format_size(bytes_seen),
                format_size(total_bytes)
            ));
        }
    }

    let mut writer = zip.finish().context("finalising archive failed")?;
    writer.flush().context("flushing archive failed")?;
    writer
        .into_inner()
        .map_err(|e| e.into_error())
        .context("flushing archive failed")?
        .sync_all()
        .context("syncing archive failed")?;

    summary.compressed = Some(
        fs::metadata(archive_path)
            .with_context(|| format!("cannot stat {}", archive_path.display()))?
            .len(),
    );
    Ok(summary)
}

fn add_entry<W: Write + Seek>(zip: &mut ZipWriter<W>, source: &SourceFile) -> anyhow::Result<u64> {
    // Open before starting the entry so an unreadable file leaves no trace.
    let mut input = File::open(&source.path)?;
    let meta = input.metadata()?;

    let mut options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(meta.len() >= u64::from(u32::MAX));
    if let Some(stamp) = meta.modified().ok().and_then(zip_time) {
        options = options.last_modified_time(stamp);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        options = options.unix_permissions(meta.permissions().mode());
    }

    let name = entry_name(&source.relative);
    debug!("Adding {} as {name}", source.path.display());
    zip.start_file(name, options)?;
    match io::copy(&mut input, &mut *zip) {
        Ok(bytes) => Ok(bytes),
        Err(err) => {
            zip.abort_file()?;
            Err(err.into())
        }
    }
}

/// ZIP timestamps are local time with two-second resolution, 1980..=2107.
fn zip_time(modified: SystemTime) -> Option<zip::DateTime> {
    use chrono::{Datelike, Local, Timelike};

    let local: chrono::DateTime<Local> = modified.into();
    zip::DateTime::from_date_and_time(
        u16::try_from(local.year()).ok()?,
        local.month() as u8,
        local.day() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second() as u8,
    )
    .ok()
}
