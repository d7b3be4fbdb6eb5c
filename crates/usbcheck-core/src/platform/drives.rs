/// Removable-drive enumeration.
///
/// On Windows this walks the logical drive strings and keeps the ones whose
/// type is `DRIVE_REMOVABLE`, reading label and filesystem name from the
/// volume information. Elsewhere the `sysinfo` disk list is filtered on its
/// removable flag.
use crate::model::DriveRef;

/// Enumerate the removable drives currently mounted.
///
/// Returns an empty vec when nothing is attached or the OS query fails.
pub fn list_removable_drives() -> Vec<DriveRef> {
    let drives = imp::list();
    tracing::info!("Found {} USB drive(s)", drives.len());
    drives
}

#[cfg(windows)]
mod imp {
    use crate::model::DriveRef;
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;
    use windows::Win32::Storage::FileSystem::{
        GetDriveTypeW, GetLogicalDriveStringsW, GetVolumeInformationW,
    };

    // Drive type constant from the Windows API.
    const DRIVE_REMOVABLE_VAL: u32 = 2;

    pub(super) fn list() -> Vec<DriveRef> {
        let mut drives = Vec::new();

        // GetLogicalDriveStringsW returns null-separated drive root strings.
        let mut buffer = [0u16; 256];
        let len = unsafe { GetLogicalDriveStringsW(Some(&mut buffer)) };

        if len == 0 {
            tracing::warn!("GetLogicalDriveStringsW returned 0");
            return drives;
        }

        let full = OsString::from_wide(&buffer[..len as usize]);
        let full_str = full.to_string_lossy();

        for root in full_str.split('\0').filter(|s| !s.is_empty()) {
            let root_wide: Vec<u16> = root.encode_utf16().chain(std::iter::once(0)).collect();
            let root_pcwstr = windows::core::PCWSTR(root_wide.as_ptr());

            if unsafe { GetDriveTypeW(root_pcwstr) } != DRIVE_REMOVABLE_VAL {
                continue;
            }

            let mut label_buf = [0u16; 256];
            let mut fs_buf = [0u16; 256];
            let has_volume_info = unsafe {
                GetVolumeInformationW(
                    root_pcwstr,
                    Some(&mut label_buf),
                    None,
                    None,
                    None,
                    Some(&mut fs_buf),
                )
                .is_ok()
            };

            // An empty card reader slot has no volume; skip it.
            if !has_volume_info {
                tracing::debug!("No volume information for {root}, skipping");
                continue;
            }

            let label = wide_to_string(&label_buf);
            let filesystem = wide_to_string(&fs_buf);
            drives.push(DriveRef::new(root, &label, &filesystem));
        }

        drives
    }

    fn wide_to_string(buf: &[u16]) -> String {
        let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
        String::from_utf16_lossy(&buf[..end])
    }
}

#[cfg(not(windows))]
mod imp {
    use crate::model::DriveRef;
    use sysinfo::Disks;

    pub(super) fn list() -> Vec<DriveRef> {
        let disks = Disks::new_with_refreshed_list();
        disks
            .list()
            .iter()
            .filter(|disk| disk.is_removable())
            .map(|disk| {
                // sysinfo reports the device name (e.g. /dev/sdb1) rather than
                // a volume label on Linux; it is still the best we have.
                DriveRef::new(
                    disk.mount_point(),
                    &disk.name().to_string_lossy(),
                    &disk.file_system().to_string_lossy(),
                )
            })
            .collect()
    }
}
