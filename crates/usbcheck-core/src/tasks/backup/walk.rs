/// Source enumeration for backups.
///
/// Uses `jwalk`'s parallel walker, pruning reserved system entries in
/// `process_read_dir` so excluded directories are never descended into.
/// Unreadable directories and files are counted and logged, never fatal.
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Exact names (case-insensitive) that are never backed up.
const RESERVED_NAMES: &[&str] = &[
    "System Volume Information",
    ".Trashes",
    ".Spotlight-V100",
    ".fseventsd",
];

/// Names with this prefix (`$RECYCLE.BIN`, `$Extend`, ...) are never backed up.
const RESERVED_PREFIX: char = '$';

/// Whether a directory entry is a platform-reserved artifact.
pub fn is_reserved(name: &OsStr) -> bool {
    let name = name.to_string_lossy();
    name.starts_with(RESERVED_PREFIX)
        || RESERVED_NAMES
            .iter()
            .any(|reserved| name.eq_ignore_ascii_case(reserved))
}

/// A regular file eligible for backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to the drive root.
    pub relative: PathBuf,
    pub size: u64,
}

/// Everything found by one walk.
#[derive(Debug, Default)]
pub struct Inventory {
    pub files: Vec<SourceFile>,
    pub total_bytes: u64,
    /// Entries that could not be read during the walk.
    pub unreadable: u64,
}

impl Inventory {
    pub fn file_count(&self) -> u64 {
        self.files.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Walk `root` and list every eligible regular file, sorted by path.
///
/// `skip` excludes one exact path (the archive being written, when it lives
/// on the source drive).
pub fn enumerate(root: &Path, skip: Option<&Path>) -> Inventory {
    let walker = jwalk::WalkDir::new(root)
        .skip_hidden(false)
        .follow_links(false)
        .sort(true)
        .parallelism(jwalk::Parallelism::RayonNewPool(num_cpus::get()))
        .process_read_dir(|_depth, _path, _state, children| {
            children.retain(|entry| match entry {
                Ok(e) => !is_reserved(e.file_name()),
                Err(_) => true,
            });
        });

    let mut inventory = Inventory::default();
    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                inventory.unreadable += 1;
                warn!("Skipping unreadable entry: {err}");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if skip.is_some_and(|s| s == path) {
            continue;
        }

        let size = match entry.metadata() {
            Ok(meta) => meta.len(),
            Err(err) => {
                inventory.unreadable += 1;
                warn!("Skipping {}: {err}", path.display());
                continue;
            }
        };

        let relative = match path.strip_prefix(root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => PathBuf::from(entry.file_name()),
        };

        inventory.total_bytes += size;
        inventory.files.push(SourceFile {
            path,
            relative,
            size,
        });
    }
    inventory
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_reserved_names() {
        assert!(is_reserved(OsStr::new("$RECYCLE.BIN")));
        assert!(is_reserved(OsStr::new("System Volume Information")));
        assert!(is_reserved(OsStr::new("system volume information")));
        assert!(is_reserved(OsStr::new(".Trashes")));
        assert!(!is_reserved(OsStr::new("Photos")));
        assert!(!is_reserved(OsStr::new("a$b")));
    }

    #[test]
    fn test_enumerate_skips_reserved_and_counts_bytes() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::create_dir_all(root.join("System Volume Information")).unwrap();
        fs::write(root.join("a.txt"), vec![1u8; 10]).unwrap();
        fs::write(root.join("docs").join("b.txt"), vec![2u8; 20]).unwrap();
        fs::write(root.join("System Volume Information").join("IndexerVolumeGuid"), b"x")
            .unwrap();
        fs::write(root.join("$hidden.dat"), b"y").unwrap();

        let inv = enumerate(root, None);
        let rels: Vec<PathBuf> = inv.files.iter().map(|f| f.relative.clone()).collect();
        assert_eq!(rels, vec![PathBuf::from("a.txt"), Path::new("docs").join("b.txt")]);
        assert_eq!(inv.total_bytes, 30);
        assert_eq!(inv.unreadable, 0);
    }

    #[test]
    fn test_enumerate_honours_skip_path() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("keep.txt"), b"k").unwrap();
        let archive = tmp.path().join("backup.zip");
        fs::write(&archive, b"partial").unwrap();

        let inv = enumerate(tmp.path(), Some(&archive));
        assert_eq!(inv.file_count(), 1);
        assert_eq!(inv.files[0].relative, PathBuf::from("keep.txt"));
    }
}
