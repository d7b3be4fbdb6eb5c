/// Bottom status bar -- progress of the active task and privilege badge.
use crate::state::AppState;
use egui::Ui;

/// Draw the status bar at the bottom of the window.
pub fn status_bar(ui: &mut Ui, state: &AppState, elevated: bool) {
    let color_weak = ui.visuals().weak_text_color();
    let color_normal = ui.visuals().text_color();
    let color_success = egui::Color32::from_rgb(0xa6, 0xe3, 0xa1);

    ui.horizontal(|ui| {
        if state.is_busy() {
            ui.spinner();
            ui.label(
                egui::RichText::new(state.status_text())
                    .size(12.0)
                    .color(color_normal),
            );
        } else {
            ui.label(
                egui::RichText::new(state.status_text())
                    .size(12.0)
                    .color(color_weak),
            );
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if elevated {
                ui.label(egui::RichText::new("🛡 Admin").size(11.0).color(color_success));
                ui.separator();
            }
            ui.add(
                egui::ProgressBar::new(state.progress())
                    .desired_width(220.0)
                    .show_percentage(),
            );
        });
    });
}
