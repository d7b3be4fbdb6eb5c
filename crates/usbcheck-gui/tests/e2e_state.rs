/// End-to-end tests for `AppState` -- the GUI application state machine.
///
/// These tests drive the real request paths of `AppState` without spinning
/// up an egui window: busy rejection, validation dialogs, confirmation and
/// fallback prompts, backup destination handling, and output buffering.
///
/// Drives are temporary directories; capacity figures come from a fixed
/// probe so free-space preconditions are deterministic.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};

use tempfile::TempDir;
use usbcheck_core::platform::{FixedStorage, RepairProcess, RepairTool, StorageProbe};
use usbcheck_core::{
    Action, AnalyzeMode, AppConfig, Dispatcher, DriveRef, RepairMode, StorageUsage, TaskConfig,
    TaskDescriptor,
};
use usbcheck_gui::state::{AppState, Dialog, BUSY_MESSAGE};

// ── Helpers ───────────────────────────────────────────────────────────────────

const MB: u64 = 1024 * 1024;

fn small_config() -> AppConfig {
    AppConfig {
        tasks: TaskConfig {
            benchmark_size: 64 * 1024,
            chunk_size: 8 * 1024,
            ..TaskConfig::default()
        },
        ..AppConfig::default()
    }
}

/// Repair tool that is present but never granted the privileges it needs,
/// so no real disk check can start from a test.
struct UnprivilegedTool;

impl RepairTool for UnprivilegedTool {
    fn is_supported(&self) -> bool {
        true
    }

    fn has_elevated_privileges(&self) -> bool {
        false
    }

    fn launch(&self, _letter: char, _mode: RepairMode) -> io::Result<RepairProcess> {
        Err(io::Error::other("repair tool must not be launched"))
    }
}

fn state_with_probe(probe: Arc<dyn StorageProbe>) -> AppState {
    let config = small_config();
    let dispatcher = Dispatcher::new(config.tasks.clone(), probe, Arc::new(UnprivilegedTool));
    AppState::with_dispatcher(config, dispatcher)
}

/// State with one drive (the temp dir) and `free` bytes reported free.
fn state_with_drive(drive_dir: &Path, free: u64) -> AppState {
    let probe = FixedStorage(StorageUsage::from_total_free(100 * MB, free));
    let mut state = state_with_probe(Arc::new(probe));
    state.set_drives(vec![DriveRef::new(drive_dir, "STICK", "vfat")]);
    state
}

fn make_drive() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("a.txt"), vec![b'a'; 100]).unwrap();
    fs::create_dir_all(tmp.path().join("sub")).unwrap();
    fs::write(tmp.path().join("sub").join("b.txt"), "usb ".repeat(100)).unwrap();
    tmp
}

/// Pump `process_messages()` until the task handle is retired or the
/// deadline expires.
fn pump_until_done(state: &mut AppState) {
    let deadline = Instant::now() + Duration::from_secs(30);
    while state.has_task() {
        assert!(
            Instant::now() < deadline,
            "task did not complete within 30 seconds"
        );
        state.process_messages();
        std::thread::sleep(Duration::from_millis(10));
    }
}

fn output(state: &AppState) -> String {
    state.output_text()
}

/// Capacity probe that blocks until the test releases it.
struct GatedStorage {
    gate: Mutex<mpsc::Receiver<()>>,
    entered: Arc<AtomicBool>,
}

impl StorageProbe for GatedStorage {
    fn usage(&self, _path: &Path) -> io::Result<StorageUsage> {
        self.entered.store(true, Ordering::SeqCst);
        let _ = self.gate.lock().unwrap().recv();
        Ok(StorageUsage::from_total_free(100 * MB, 60 * MB))
    }
}

// ── Drives and validation ─────────────────────────────────────────────────────

#[test]
fn empty_drive_list_reports_and_clears_selection() {
    let mut state = state_with_probe(Arc::new(FixedStorage(StorageUsage::default())));
    state.set_drives(Vec::new());

    assert!(state.selection.is_empty());
    assert!(state.selections().is_empty());
    assert_eq!(output(&state), "No USB drives found.\n");
}

#[test]
fn refresh_selects_first_drive() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    let mut state = state_with_probe(Arc::new(FixedStorage(StorageUsage::default())));
    state.set_drives(vec![
        DriveRef::new(a.path(), "FIRST", "vfat"),
        DriveRef::new(b.path(), "", "exfat"),
    ]);

    assert_eq!(state.selections().len(), 2);
    assert_eq!(state.selection, state.selections()[0]);
    assert!(state.selections()[1].contains("No Label"));
    assert!(output(&state).is_empty());
}

#[test]
fn request_without_selection_warns() {
    let mut state = state_with_probe(Arc::new(FixedStorage(StorageUsage::default())));
    state.set_drives(Vec::new());
    state.request(Action::Benchmark);

    assert_eq!(
        state.dialog.as_ref().map(Dialog::text),
        Some("Please select a valid USB drive.")
    );
    assert!(!state.has_task());
}

#[test]
fn unknown_selection_warns() {
    let drive = make_drive();
    let mut state = state_with_drive(drive.path(), 60 * MB);
    state.selection = "Z:\\ - GHOST (FAT32)".to_string();
    state.request(Action::Analyze(AnalyzeMode::StorageOnly));

    assert_eq!(
        state.dialog.as_ref().map(Dialog::text),
        Some("Invalid drive selection.")
    );
}

#[test]
fn vanished_drive_warns() {
    let drive = make_drive();
    let path = drive.path().to_path_buf();
    let mut state = state_with_drive(&path, 60 * MB);
    drop(drive);

    state.request(Action::Analyze(AnalyzeMode::StorageOnly));
    let text = state.dialog.as_ref().map(Dialog::text).unwrap_or_default();
    assert!(text.contains("is not available"), "{text}");
    assert!(!state.has_task());
}

// ── Task lifecycle ────────────────────────────────────────────────────────────

#[test]
fn storage_analysis_runs_to_completion() {
    let drive = make_drive();
    let mut state = state_with_drive(drive.path(), 60 * MB);
    state.request(Action::Analyze(AnalyzeMode::StorageOnly));
    assert!(state.has_task());

    pump_until_done(&mut state);

    let text = output(&state);
    assert!(text.contains("Usage: 40.0%"), "{text}");
    assert!(!state.is_busy());
    assert_eq!(state.progress(), 1.0);
    assert_eq!(state.status_text(), "Ready");
    assert!(state.dialog.is_none());
}

#[test]
fn second_request_while_busy_is_rejected() {
    let drive = make_drive();
    let (release, gate) = mpsc::channel();
    let entered = Arc::new(AtomicBool::new(false));
    let mut state = state_with_probe(Arc::new(GatedStorage {
        gate: Mutex::new(gate),
        entered: entered.clone(),
    }));
    state.set_drives(vec![DriveRef::new(drive.path(), "STICK", "vfat")]);

    state.request(Action::Analyze(AnalyzeMode::StorageOnly));
    assert!(state.is_busy());
    assert!(state.status_text().starts_with("Storage analysis of"));

    let chooser_called = AtomicBool::new(false);
    state.request(Action::Benchmark);
    state.request_backup(|_, _| {
        chooser_called.store(true, Ordering::SeqCst);
        None
    });

    let busy_lines = state.output_lines().filter(|l| *l == BUSY_MESSAGE).count();
    assert_eq!(busy_lines, 2);
    assert!(state.dialog.is_none());
    assert!(!chooser_called.load(Ordering::SeqCst));

    release.send(()).unwrap();
    pump_until_done(&mut state);
    assert!(entered.load(Ordering::SeqCst));
    assert!(output(&state).contains("Usage: 40.0%"));
    assert!(!state.is_busy());
}

#[test]
fn repair_requires_confirmation() {
    let drive = make_drive();
    let mut state = state_with_drive(drive.path(), 60 * MB);
    state.request(Action::Repair(RepairMode::Deep));

    match &state.dialog {
        Some(Dialog::Confirm {
            text, descriptor, ..
        }) => {
            assert!(text.starts_with("Do you want to repair drive"));
            assert!(text.contains("several hours"));
            assert!(matches!(
                descriptor,
                TaskDescriptor::Repair {
                    mode: RepairMode::Deep,
                    ..
                }
            ));
        }
        other => panic!("expected confirmation, got {other:?}"),
    }
    assert!(!state.has_task());

    state.answer_dialog(false);
    assert!(state.dialog.is_none());
    assert!(!state.has_task());
}

#[test]
fn confirmed_repair_reports_outcome() {
    let drive = make_drive();
    let mut state = state_with_drive(drive.path(), 60 * MB);
    state.request(Action::Repair(RepairMode::Quick));
    state.answer_dialog(true);
    pump_until_done(&mut state);

    let text = output(&state);
    assert!(
        text.contains("Error during repair: Administrator privileges required for repair."),
        "{text}"
    );
    assert!(!state.is_busy());
    assert_eq!(state.progress(), 1.0);
}

// ── Space preconditions ───────────────────────────────────────────────────────

#[test]
fn benchmark_without_space_warns_and_starts_nothing() {
    let drive = make_drive();
    let mut state = state_with_drive(drive.path(), 1024);
    state.request(Action::Benchmark);

    assert!(matches!(state.dialog, Some(Dialog::Warning { .. })));
    assert!(!state.has_task());
    assert!(!output(&state).contains("Starting benchmark"));
}

#[test]
fn benchmark_with_space_runs_and_cleans_up() {
    let drive = make_drive();
    let mut state = state_with_drive(drive.path(), 60 * MB);
    state.request(Action::Benchmark);
    assert!(output(&state).starts_with("Starting benchmark... This may take a few moments.\n"));

    pump_until_done(&mut state);
    let text = output(&state);
    assert!(text.contains("Write Speed: "), "{text}");
    assert!(text.contains("Read Speed: "), "{text}");
    assert!(!drive
        .path()
        .join(&state.config.tasks.benchmark_file_name)
        .exists());
}

#[test]
fn full_analysis_without_space_offers_storage_only() {
    let drive = make_drive();
    let mut state = state_with_drive(drive.path(), 1024);
    state.request(Action::Analyze(AnalyzeMode::Full));

    match &state.dialog {
        Some(Dialog::Confirm { descriptor, .. }) => assert!(matches!(
            descriptor,
            TaskDescriptor::Analyze {
                mode: AnalyzeMode::StorageOnly,
                ..
            }
        )),
        other => panic!("expected fallback prompt, got {other:?}"),
    }

    state.answer_dialog(true);
    pump_until_done(&mut state);
    let text = output(&state);
    assert!(text.contains("Free: "));
    assert!(!text.contains("Performance:"));
}

// ── Backup ────────────────────────────────────────────────────────────────────

#[test]
fn cancelled_chooser_starts_nothing() {
    let drive = make_drive();
    let mut state = state_with_drive(drive.path(), 60 * MB);
    state.request_backup(|_, _| None);

    assert!(!state.has_task());
    assert!(state.dialog.is_none());
}

#[test]
fn mirror_into_source_drive_is_rejected() {
    let drive = make_drive();
    let inside = drive.path().join("backup");
    fs::create_dir_all(&inside).unwrap();
    let mut state = state_with_drive(drive.path(), 60 * MB);
    state.request_backup(|_, _| Some(inside.clone()));

    let text = state.dialog.as_ref().map(Dialog::text).unwrap_or_default();
    assert!(text.contains("inside the drive"), "{text}");
    assert!(!state.has_task());
}

#[test]
fn archive_backup_end_to_end() {
    let drive = make_drive();
    let out = TempDir::new().unwrap();
    let mut state = state_with_drive(drive.path(), 60 * MB);
    state.backup_as_archive = true;

    let mut offered: Option<(PathBuf, bool)> = None;
    let dest = out.path().join("usb.zip");
    state.request_backup(|drive, archive| {
        offered = Some((drive.path().to_path_buf(), archive));
        Some(dest.clone())
    });
    pump_until_done(&mut state);

    assert_eq!(offered, Some((drive.path().to_path_buf(), true)));
    assert!(dest.exists());
    let text = output(&state);
    assert!(text.contains("2 files archived."), "{text}");
    assert!(text.contains("Compression ratio: "), "{text}");
    assert_eq!(
        state.dialog,
        Some(Dialog::Info {
            title: "Backup Complete".to_string(),
            text: "Successfully backed up 2 files.".to_string(),
        })
    );
}

#[test]
fn mirror_backup_end_to_end() {
    let drive = make_drive();
    let out = TempDir::new().unwrap();
    let mut state = state_with_drive(drive.path(), 60 * MB);

    let dest = out.path().to_path_buf();
    state.request_backup(|_, archive| {
        assert!(!archive);
        Some(dest.clone())
    });
    pump_until_done(&mut state);

    assert_eq!(fs::read(out.path().join("a.txt")).unwrap(), vec![b'a'; 100]);
    assert!(out.path().join("sub").join("b.txt").exists());
    assert!(output(&state).contains("Backup completed: 2 files copied"));
    assert_eq!(
        state.dialog.as_ref().map(Dialog::title),
        Some("Backup Complete")
    );
    state.dismiss_dialog();
    assert!(state.dialog.is_none());
}

// ── Output buffer and log ─────────────────────────────────────────────────────

#[test]
fn output_is_split_into_lines_and_capped() {
    let mut state = state_with_probe(Arc::new(FixedStorage(StorageUsage::default())));
    state.config.max_output_lines = 3;

    state.push_output("one\ntwo\n");
    state.push_output("three\r\n");
    state.push_output("four");

    let lines: Vec<&str> = state.output_lines().collect();
    assert_eq!(lines, vec!["two", "three", "four"]);

    state.clear_output();
    assert_eq!(state.output_lines().len(), 0);
}

#[test]
fn missing_log_file_shows_info() {
    let dir = TempDir::new().unwrap();
    let mut state = state_with_probe(Arc::new(FixedStorage(StorageUsage::default())));
    state.config.log_file = dir
        .path()
        .join("missing.log")
        .to_string_lossy()
        .into_owned();

    state.open_log_file();
    match &state.dialog {
        Some(Dialog::Info { text, .. }) => assert_eq!(text, "Log file not found."),
        other => panic!("expected info dialog, got {other:?}"),
    }
    state.dismiss_dialog();
    assert!(state.dialog.is_none());
}
