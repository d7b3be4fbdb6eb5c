/// Tunable constants for the task pipeline and the frontend.
///
/// Everything here has a compiled-in default that matches the behaviour
/// users expect from the tool. Tests build smaller configurations (a few
/// KiB of benchmark payload instead of 100 MiB) through the same structs.
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MIB: u64 = 1024 * 1024;

/// Parameters consumed by the task bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    /// Size of the random payload written by the benchmark.
    pub benchmark_size: u64,
    /// Read-back chunk size for the benchmark.
    pub chunk_size: usize,
    /// Name of the temporary file created in the drive root.
    pub benchmark_file_name: String,
    /// Free space required before a benchmark, as a multiple of
    /// `benchmark_size`.
    pub free_space_factor: f64,
    /// Mirror backup emits a progress line every this many files.
    pub mirror_report_every: u64,
    /// Archive backup emits a progress line every this many files.
    pub archive_report_every: u64,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            benchmark_size: 100 * MIB,
            chunk_size: MIB as usize,
            benchmark_file_name: "uct_benchmark_test.bin".to_string(),
            free_space_factor: 1.5,
            mirror_report_every: 10,
            archive_report_every: 50,
        }
    }
}

impl TaskConfig {
    /// Minimum free bytes a drive needs before a benchmark may start.
    pub fn required_free_space(&self) -> u64 {
        (self.benchmark_size as f64 * self.free_space_factor).ceil() as u64
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// How often the UI drains the message channel while a task runs.
    pub poll_interval_ms: u64,
    /// Persistent log file, relative to the working directory.
    pub log_file: String,
    /// The log file is deleted at startup when it exceeds this size.
    pub log_max_bytes: u64,
    /// Maximum lines retained in the output panel.
    pub max_output_lines: usize,
    pub tasks: TaskConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            log_file: "usb_checker.log".to_string(),
            log_max_bytes: 10 * MIB,
            max_output_lines: 5_000,
            tasks: TaskConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
