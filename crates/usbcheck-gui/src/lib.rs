/// USB Checker GUI -- egui-based desktop frontend.
///
/// This crate contains all UI code. Business logic lives in `usbcheck-core`.
pub mod app;
pub mod icon;
pub mod state;
pub mod widgets;

pub use app::{UsbCheckerApp, UsbCheckerState};
