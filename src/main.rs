//! USB Checker -- analyse, repair, benchmark, and back up removable drives.
//!
//! Thin binary entry point. All logic lives in the `usbcheck-core`
//! and `usbcheck-gui` crates.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod logging;

use usbcheck_core::AppConfig;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::default();
    let _log_guard = logging::init(&config)?;

    tracing::info!("USB Checker {} starting", env!("CARGO_PKG_VERSION"));

    let icon = usbcheck_gui::icon::generate_icon(64);

    // Enumerate drives before the window exists so the first frame already
    // shows the picker populated.
    let state = usbcheck_gui::UsbCheckerState::build(config);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("USB Checker")
            .with_inner_size([960.0, 640.0])
            .with_min_inner_size([760.0, 420.0])
            .with_icon(icon),
        ..Default::default()
    };

    eframe::run_native(
        "USB Checker",
        options,
        Box::new(|cc| {
            Ok(Box::new(usbcheck_gui::UsbCheckerApp::with_state(
                cc, state,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {e}"))?;

    tracing::info!("USB Checker exiting");
    Ok(())
}
