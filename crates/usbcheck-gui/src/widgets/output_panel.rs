/// Scrollable task output.
///
/// Only the visible rows are laid out, so a full buffer costs the same per
/// frame as a short one.
use crate::state::AppState;
use egui::Ui;

/// Draw the output log, pinned to the newest line.
pub fn output_panel(ui: &mut Ui, state: &AppState) {
    let row_height = ui.text_style_height(&egui::TextStyle::Monospace);
    let total_rows = state.output_lines().len();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show_rows(ui, row_height, total_rows, |ui, rows| {
                for line in state.output_lines().skip(rows.start).take(rows.len()) {
                    ui.label(egui::RichText::new(line).monospace());
                }
            });
    });
}
