/// Sequential write/read benchmark.
///
/// Writes a random payload to a temporary file in the drive root, reads it
/// back in fixed-size chunks, and reports both throughputs in MB/s. The
/// temporary file is removed on every exit path.
use crate::config::TaskConfig;
use crate::model::size::to_mb;
use crate::model::DriveRef;
use crate::task::TaskContext;
use anyhow::Context;
use rand::RngCore;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Shortest duration used as a divisor, so a cached, instant read cannot
/// divide by zero.
const MIN_ELAPSED_SECS: f64 = 1e-6;

/// Result of one write/read pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub write_mb_s: f64,
    pub read_mb_s: f64,
}

impl Measurement {
    pub fn average(&self) -> f64 {
        (self.write_mb_s + self.read_mb_s) / 2.0
    }
}

/// Throughput in MB/s (binary megabytes) for `bytes` moved in `elapsed`.
pub fn throughput_mb_s(bytes: u64, elapsed: Duration) -> f64 {
    to_mb(bytes) / elapsed.as_secs_f64().max(MIN_ELAPSED_SECS)
}

/// Benchmark task body.
pub fn run(ctx: &TaskContext, drive: &DriveRef, config: &TaskConfig) -> anyhow::Result<()> {
    let m = measure(ctx, drive.path(), config, 50)?;

    ctx.say(format!(
        "\nBenchmark Results:\nWrite Speed: {:.2} MB/s\nRead Speed: {:.2} MB/s\n",
        m.write_mb_s, m.read_mb_s
    ));
    info!(
        "Benchmarked {} - Write: {:.2} MB/s, Read: {:.2} MB/s",
        drive, m.write_mb_s, m.read_mb_s
    );
    ctx.progress().finish();
    Ok(())
}

/// Write then read the payload under `root`.
///
/// Progress is raised to `after_write` once the write pass completes.
pub(crate) fn measure(
    ctx: &TaskContext,
    root: &Path,
    config: &TaskConfig,
    after_write: u8,
) -> anyhow::Result<Measurement> {
    let size = config.benchmark_size;
    let test_file = TempFile::new(root.join(&config.benchmark_file_name));

    ctx.say("Running write test...\n");
    let payload = random_payload(size)?;
    let start = Instant::now();
    {
        let mut file = File::create(test_file.path())
            .with_context(|| format!("cannot create {}", test_file.path().display()))?;
        file.write_all(&payload)
            .with_context(|| format!("write to {} failed", test_file.path().display()))?;
        // Without a flush to the device this would measure the page cache.
        file.sync_all().context("flushing the test file failed")?;
    }
    let write_elapsed = start.elapsed();
    drop(payload);
    let write_mb_s = throughput_mb_s(size, write_elapsed);
    debug!("Write pass: {size} bytes in {write_elapsed:?}");

    ctx.progress().set(after_write);
    ctx.say("Running read test...\n");

    let start = Instant::now();
    let mut file = File::open(test_file.path())
        .with_context(|| format!("cannot reopen {}", test_file.path().display()))?;
    let mut chunk = vec![0u8; config.chunk_size.max(1)];
    let mut read_total: u64 = 0;
    loop {
        let n = file.read(&mut chunk).context("read-back failed")?;
        if n == 0 {
            break;
        }
        read_total += n as u64;
    }
    let read_elapsed = start.elapsed();
    let read_mb_s = throughput_mb_s(read_total, read_elapsed);
    debug!("Read pass: {read_total} bytes in {read_elapsed:?}");

    Ok(Measurement {
        write_mb_s,
        read_mb_s,
    })
}

fn random_payload(size: u64) -> anyhow::Result<Vec<u8>> {
    let len = usize::try_from(size).context("benchmark payload does not fit in memory")?;
    let mut payload = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut payload);
    Ok(payload)
}

/// Removes the benchmark file when dropped.
struct TempFile {
    path: PathBuf,
}

impl TempFile {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }
        if let Err(err) = fs::remove_file(&self.path) {
            warn!("Failed to remove test file {}: {err}", self.path.display());
        }
    }
}
