/// Main `eframe::App` implementation for USB Checker.
///
/// Composes the drive picker, action bar, output log, and status bar, and
/// renders whichever modal dialog the state machine has raised.
use crate::state::{AppState, Dialog};
use crate::widgets;
use usbcheck_core::AppConfig;

/// Pre-built application state.
///
/// Construct this before calling `eframe::run_native` so drive enumeration
/// completes before the OS window is created.
pub struct UsbCheckerState {
    pub(crate) inner: AppState,
}

impl UsbCheckerState {
    /// Enumerate drives and wire up the task pipeline.
    pub fn build(config: AppConfig) -> Self {
        Self {
            inner: AppState::new(config),
        }
    }
}

/// The USB Checker application.
pub struct UsbCheckerApp {
    state: AppState,
    /// Sampled once; elevation cannot change while the process runs.
    elevated: bool,
}

impl UsbCheckerApp {
    pub fn with_state(cc: &eframe::CreationContext<'_>, state: UsbCheckerState) -> Self {
        load_system_font(&cc.egui_ctx);
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        Self {
            state: state.inner,
            elevated: usbcheck_core::platform::is_elevated(),
        }
    }

    fn dialog_window(&mut self, ctx: &egui::Context) {
        let Some(dialog) = self.state.dialog.clone() else {
            return;
        };

        let mut answer: Option<bool> = None;
        egui::Window::new(dialog.title())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .fixed_size([360.0, 0.0])
            .show(ctx, |ui| {
                let (icon, color) = match &dialog {
                    Dialog::Warning { .. } => ("⚠", egui::Color32::from_rgb(0xfa, 0xb3, 0x87)),
                    Dialog::Info { .. } => ("ℹ", ui.visuals().hyperlink_color),
                    Dialog::Confirm { .. } => ("❓", ui.visuals().hyperlink_color),
                };
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(icon).size(22.0).color(color));
                    ui.label(dialog.text());
                });
                ui.add_space(10.0);

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if matches!(dialog, Dialog::Confirm { .. }) {
                        if ui.button("  No  ").clicked() {
                            answer = Some(false);
                        }
                        if ui.button("  Yes  ").clicked() {
                            answer = Some(true);
                        }
                    } else if ui.button("  OK  ").clicked() {
                        answer = Some(false);
                    }
                });
            });

        match answer {
            Some(yes) if matches!(dialog, Dialog::Confirm { .. }) => self.state.answer_dialog(yes),
            Some(_) => self.state.dismiss_dialog(),
            None => {}
        }
    }
}

impl eframe::App for UsbCheckerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ── Drain worker output ───────────────────────────────────────────
        self.state.process_messages();
        if self.state.has_task() {
            ctx.request_repaint_after(self.state.config.poll_interval());
        }

        // ── Top: drive picker and actions ─────────────────────────────────
        egui::TopBottomPanel::top("controls")
            .min_height(72.0)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                widgets::drive_picker::drive_picker(ui, &mut self.state);
                ui.add_space(4.0);
                ui.separator();
                widgets::toolbar::toolbar(ui, &mut self.state);
                ui.add_space(4.0);
            });

        // ── Bottom status bar ─────────────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .min_height(26.0)
            .show(ctx, |ui| {
                ui.add_space(2.0);
                widgets::status_bar::status_bar(ui, &self.state, self.elevated);
                ui.add_space(2.0);
            });

        // ── Central output log ────────────────────────────────────────────
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Output");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("Copy").clicked() {
                        ctx.copy_text(self.state.output_text());
                    }
                    if ui.small_button("Clear").clicked() {
                        self.state.clear_output();
                    }
                });
            });
            ui.add_space(4.0);
            widgets::output_panel::output_panel(ui, &self.state);
        });

        self.dialog_window(ctx);
    }
}

/// Register Segoe UI as the preferred proportional font when present.
fn load_system_font(ctx: &egui::Context) {
    let system_root = std::env::var("SystemRoot").unwrap_or_else(|_| "C:\\Windows".to_string());
    let font_path = format!("{system_root}\\Fonts\\segoeui.ttf");

    let bytes = match std::fs::read(&font_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!("Segoe UI not loaded from {font_path}: {e} -- using default font");
            return;
        }
    };

    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("SegoeUI".to_owned(), egui::FontData::from_owned(bytes).into());
    fonts
        .families
        .entry(egui::FontFamily::Proportional)
        .or_default()
        .insert(0, "SegoeUI".to_owned());
    ctx.set_fonts(fonts);
    tracing::info!("Loaded Segoe UI from {font_path}");
}
