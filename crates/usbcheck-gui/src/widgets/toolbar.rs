/// Action bar -- the four drive operations with their mode selectors, and
/// the log-file shortcut.
use std::path::PathBuf;

use crate::state::AppState;
use egui::Ui;
use usbcheck_core::{Action, AnalyzeMode, DriveRef, RepairMode};

const BUTTON_SIZE: egui::Vec2 = egui::vec2(96.0, 28.0);

/// Draw the action bar.
pub fn toolbar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        // Buttons stay enabled while a task runs; the request path reports
        // the busy slot in the output.
        if ui
            .add(egui::Button::new("📊 Analyze").min_size(BUTTON_SIZE))
            .on_hover_text("Report capacity, optionally with a read/write speed test")
            .clicked()
        {
            let mode = if state.analyze_with_speed {
                AnalyzeMode::Full
            } else {
                AnalyzeMode::StorageOnly
            };
            state.request(Action::Analyze(mode));
        }
        ui.checkbox(&mut state.analyze_with_speed, "Measure speed");

        ui.separator();

        if ui
            .add(egui::Button::new("🛠 Repair").min_size(BUTTON_SIZE))
            .on_hover_text("Check and fix the file system (administrator only)")
            .clicked()
        {
            state.request(Action::Repair(state.repair_mode));
        }
        egui::ComboBox::from_id_salt("repair_mode")
            .width(70.0)
            .selected_text(state.repair_mode.label())
            .show_ui(ui, |ui| {
                for mode in [RepairMode::Quick, RepairMode::Deep] {
                    ui.selectable_value(&mut state.repair_mode, mode, mode.label())
                        .on_hover_text(mode.duration_hint());
                }
            });

        ui.separator();

        if ui
            .add(egui::Button::new("⏱ Benchmark").min_size(BUTTON_SIZE))
            .on_hover_text("Sequential write and read throughput")
            .clicked()
        {
            state.request(Action::Benchmark);
        }

        ui.separator();

        if ui
            .add(egui::Button::new("💾 Backup").min_size(BUTTON_SIZE))
            .on_hover_text("Copy every file to a folder or a ZIP archive")
            .clicked()
        {
            state.request_backup(choose_backup_destination);
        }
        egui::ComboBox::from_id_salt("backup_kind")
            .width(70.0)
            .selected_text(if state.backup_as_archive { "ZIP" } else { "Folder" })
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut state.backup_as_archive, false, "Folder");
                ui.selectable_value(&mut state.backup_as_archive, true, "ZIP");
            });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .button("📄 Open Log File")
                .on_hover_text(format!("Open {}", state.log_path().display()))
                .clicked()
            {
                state.open_log_file();
            }
        });
    });
}

/// Native destination chooser. `None` when the user cancels.
fn choose_backup_destination(drive: &DriveRef, archive: bool) -> Option<PathBuf> {
    if archive {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        rfd::FileDialog::new()
            .set_title(format!("Save backup of {drive} as"))
            .add_filter("ZIP archive", &["zip"])
            .set_file_name(format!("usb_backup_{stamp}.zip"))
            .save_file()
    } else {
        rfd::FileDialog::new()
            .set_title(format!("Select backup folder for {drive}"))
            .pick_folder()
    }
}
