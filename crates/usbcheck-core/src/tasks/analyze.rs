/// Drive analysis: capacity summary, optionally followed by a speed test
/// and a performance rating.
use crate::config::TaskConfig;
use crate::model::size::format_gb;
use crate::model::{DriveRef, StorageUsage};
use crate::platform::StorageProbe;
use crate::task::{AnalyzeMode, TaskContext};
use anyhow::Context;
use std::fmt;
use tracing::info;

use super::benchmark;

/// Coarse speed rating from the mean of write and read throughput.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceTier {
    Excellent,
    Good,
    Average,
    Slow,
}

impl PerformanceTier {
    /// Thresholds are exclusive lower bounds in MB/s.
    pub fn classify(avg_mb_s: f64) -> Self {
        if avg_mb_s > 100.0 {
            Self::Excellent
        } else if avg_mb_s > 30.0 {
            Self::Good
        } else if avg_mb_s > 10.0 {
            Self::Average
        } else {
            Self::Slow
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Average => "Average",
            Self::Slow => "Slow",
        }
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Multi-line capacity report.
pub fn storage_summary(drive: &DriveRef, usage: &StorageUsage) -> String {
    let mut out = format!("Drive: {}\n", drive.path.display());
    if !drive.filesystem.is_empty() {
        out.push_str(&format!("File System: {}\n", drive.filesystem));
    }
    out.push_str(&format!(
        "Total: {}\nUsed: {}\nFree: {}\nUsage: {:.1}%\n",
        format_gb(usage.total),
        format_gb(usage.used),
        format_gb(usage.free),
        usage.usage_percent()
    ));
    out
}

/// Analyzer task body.
pub fn run(
    ctx: &TaskContext,
    drive: &DriveRef,
    mode: AnalyzeMode,
    probe: &dyn StorageProbe,
    config: &TaskConfig,
) -> anyhow::Result<()> {
    let usage = probe
        .usage(drive.path())
        .with_context(|| format!("cannot read capacity of {drive}"))?;
    ctx.say(storage_summary(drive, &usage));
    info!("Analyzed drive: {drive}");

    if mode == AnalyzeMode::StorageOnly {
        return Ok(());
    }

    ctx.progress().set(20);
    let m = benchmark::measure(ctx, drive.path(), config, 60)?;
    ctx.progress().finish();

    let avg = m.average();
    let tier = PerformanceTier::classify(avg);
    ctx.say(format!(
        "\nWrite Speed: {:.2} MB/s\nRead Speed: {:.2} MB/s\nAverage: {:.2} MB/s\nPerformance: {}\n",
        m.write_mb_s, m.read_mb_s, avg, tier
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers() {
        assert_eq!(PerformanceTier::classify(150.0), PerformanceTier::Excellent);
        assert_eq!(PerformanceTier::classify(100.0), PerformanceTier::Good);
        assert_eq!(PerformanceTier::classify(50.0), PerformanceTier::Good);
        assert_eq!(PerformanceTier::classify(30.0), PerformanceTier::Average);
        assert_eq!(PerformanceTier::classify(10.5), PerformanceTier::Average);
        assert_eq!(PerformanceTier::classify(10.0), PerformanceTier::Slow);
        assert_eq!(PerformanceTier::classify(0.0), PerformanceTier::Slow);
    }

    #[test]
    fn test_storage_summary() {
        let gb = 1024 * 1024 * 1024;
        let drive = DriveRef::new("E:\\", "STICK", "FAT32");
        let usage = StorageUsage::from_total_free(100 * gb, 60 * gb);
        let text = storage_summary(&drive, &usage);
        assert_eq!(
            text,
            "Drive: E:\\\nFile System: FAT32\nTotal: 100.00 GB\nUsed: 40.00 GB\nFree: 60.00 GB\nUsage: 40.0%\n"
        );
    }

    #[test]
    fn test_storage_summary_empty_volume() {
        let drive = DriveRef::new("E:\\", "", "");
        let text = storage_summary(&drive, &StorageUsage::default());
        assert!(!text.contains("File System"));
        assert!(text.ends_with("Usage: 0.0%\n"));
    }
}
