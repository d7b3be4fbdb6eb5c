/// Data model: drive references, capacity figures, and size formatting.
pub mod drive;
pub mod size;

pub use drive::{DriveRef, StorageUsage, NO_LABEL};
