/// Drive references and capacity figures.
use std::fmt;
use std::path::{Path, PathBuf};

/// Label shown when a volume has none.
pub const NO_LABEL: &str = "No Label";

/// A resolved removable device.
///
/// Immutable once built; a refresh produces new references rather than
/// updating old ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DriveRef {
    /// Mount point or drive root, e.g. `E:\` or `/media/usb0`.
    pub path: PathBuf,
    /// Volume label, `"No Label"` when the volume has none.
    pub label: String,
    /// Filesystem name, e.g. `FAT32`, `exfat`.
    pub filesystem: String,
}

impl DriveRef {
    pub fn new(path: impl Into<PathBuf>, label: &str, filesystem: &str) -> Self {
        let label = label.trim();
        Self {
            path: path.into(),
            label: if label.is_empty() {
                NO_LABEL.to_string()
            } else {
                label.to_string()
            },
            filesystem: filesystem.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Text shown in the drive picker: `"E:\ - STICK (FAT32)"`.
    pub fn display_name(&self) -> String {
        format!(
            "{} - {} ({})",
            self.path.display(),
            self.label,
            self.filesystem
        )
    }

    /// The device still exists on disk.
    pub fn is_present(&self) -> bool {
        self.path.exists()
    }
}

impl fmt::Display for DriveRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Capacity of a mounted volume in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StorageUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

impl StorageUsage {
    /// Build from total and free space as reported by the OS.
    pub fn from_total_free(total: u64, free: u64) -> Self {
        Self {
            total,
            used: total.saturating_sub(free),
            free,
        }
    }

    /// Used space as a percentage of total (0.0 for an empty volume).
    pub fn usage_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.used as f64 / self.total as f64 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_uses_placeholder_label() {
        let drive = DriveRef::new("/media/usb0", "  ", "vfat");
        assert_eq!(drive.label, NO_LABEL);
        assert_eq!(drive.display_name(), "/media/usb0 - No Label (vfat)");
    }

    #[test]
    fn test_usage_percent() {
        let gb = 1_000_000_000;
        let usage = StorageUsage::from_total_free(100 * gb, 60 * gb);
        assert_eq!(usage.used, 40 * gb);
        assert!((usage.usage_percent() - 40.0).abs() < 1e-9);
        assert_eq!(StorageUsage::default().usage_percent(), 0.0);
    }
}
