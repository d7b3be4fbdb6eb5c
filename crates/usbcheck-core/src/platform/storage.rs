/// Capacity queries for a mounted drive.
use crate::model::StorageUsage;
use std::io;
use std::path::Path;

/// Source of total/used/free figures for a mount point.
pub trait StorageProbe: Send + Sync {
    fn usage(&self, path: &Path) -> io::Result<StorageUsage>;
}

/// Asks the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemStorage;

#[cfg(windows)]
impl StorageProbe for SystemStorage {
    fn usage(&self, path: &Path) -> io::Result<StorageUsage> {
        use windows::Win32::Storage::FileSystem::GetDiskFreeSpaceExW;

        let root_wide: Vec<u16> = path
            .to_string_lossy()
            .encode_utf16()
            .chain(std::iter::once(0))
            .collect();
        let root_pcwstr = windows::core::PCWSTR(root_wide.as_ptr());

        let mut free_caller: u64 = 0;
        let mut total: u64 = 0;
        let mut free_total: u64 = 0;
        let result = unsafe {
            GetDiskFreeSpaceExW(
                root_pcwstr,
                Some(&mut free_caller as *mut u64),
                Some(&mut total as *mut u64),
                Some(&mut free_total as *mut u64),
            )
        };
        result.map_err(|e| io::Error::other(format!("GetDiskFreeSpaceExW failed: {e}")))?;

        Ok(StorageUsage::from_total_free(total, free_caller))
    }
}

#[cfg(not(windows))]
impl StorageProbe for SystemStorage {
    fn usage(&self, path: &Path) -> io::Result<StorageUsage> {
        let disks = sysinfo::Disks::new_with_refreshed_list();
        // The disk whose mount point is the longest prefix of `path`.
        disks
            .list()
            .iter()
            .filter(|disk| path.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().as_os_str().len())
            .map(|disk| StorageUsage::from_total_free(disk.total_space(), disk.available_space()))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no mounted volume contains {}", path.display()),
                )
            })
    }
}

/// Fixed figures, for tests and previews.
#[derive(Debug, Clone, Copy)]
pub struct FixedStorage(pub StorageUsage);

impl StorageProbe for FixedStorage {
    fn usage(&self, _path: &Path) -> io::Result<StorageUsage> {
        Ok(self.0)
    }
}
