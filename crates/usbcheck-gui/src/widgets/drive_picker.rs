/// Drive selection row.
///
/// A combo box over the picker strings captured at the last refresh, plus
/// the Refresh button that rebuilds that mapping.
use crate::state::AppState;
use egui::Ui;

/// Draw the drive picker row.
pub fn drive_picker(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("USB Drive:").strong());

        let options = state.selections().to_vec();
        let selected_text = if state.selection.is_empty() {
            "No USB drives found".to_string()
        } else {
            state.selection.clone()
        };

        egui::ComboBox::from_id_salt("drive_picker")
            .width(ui.available_width().min(420.0) - 110.0)
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                for option in options {
                    ui.selectable_value(&mut state.selection, option.clone(), option);
                }
            });

        if ui
            .button("🔄 Refresh")
            .on_hover_text("Re-enumerate removable drives")
            .clicked()
        {
            state.refresh_drives();
        }
    });
}
