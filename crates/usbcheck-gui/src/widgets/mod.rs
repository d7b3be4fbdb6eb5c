/// UI widgets for USB Checker.

pub mod drive_picker;
pub mod output_panel;
pub mod status_bar;
pub mod toolbar;
