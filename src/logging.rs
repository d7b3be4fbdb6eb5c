/// Console and file logging.
///
/// One `tracing` registry with two `fmt` layers: coloured output on stderr
/// and plain text appended to the persistent log through a non-blocking
/// writer. `RUST_LOG` overrides the default `info` filter.
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use usbcheck_core::AppConfig;

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must live until
/// the process exits.
pub fn init(config: &AppConfig) -> anyhow::Result<WorkerGuard> {
    let path = Path::new(&config.log_file);
    let discarded = discard_if_oversized(path, config.log_max_bytes);

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("log path {} has no file name", path.display()))?;
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .try_init()
        .context("installing the tracing subscriber failed")?;

    if discarded {
        tracing::info!(
            "Previous log exceeded {} bytes and was discarded",
            config.log_max_bytes
        );
    }
    Ok(guard)
}

/// Delete `path` if it is larger than `max_bytes`. Returns `true` if it was
/// removed.
fn discard_if_oversized(path: &Path, max_bytes: u64) -> bool {
    match fs::metadata(path) {
        Ok(meta) if meta.len() > max_bytes => fs::remove_file(path).is_ok(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_oversized_log_removed() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("usb_checker.log");
        fs::write(&log, vec![b'x'; 2_048]).unwrap();

        assert!(discard_if_oversized(&log, 1_024));
        assert!(!log.exists());
    }

    #[test]
    fn test_small_or_missing_log_kept() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("usb_checker.log");
        assert!(!discard_if_oversized(&log, 1_024));

        fs::write(&log, b"short").unwrap();
        assert!(!discard_if_oversized(&log, 1_024));
        assert!(log.exists());
    }
}
