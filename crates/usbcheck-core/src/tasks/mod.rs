/// Task bodies. Each takes a [`TaskContext`](crate::task::TaskContext) and
/// runs to completion on the worker thread.

pub mod analyze;
pub mod backup;
pub mod benchmark;
pub mod repair;

pub use analyze::PerformanceTier;
pub use backup::{compression_ratio, BackupSummary};
pub use benchmark::{throughput_mb_s, Measurement};
