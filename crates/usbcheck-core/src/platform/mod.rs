/// Platform collaborators -- drive enumeration, capacity queries,
/// permission checks, and the native repair tool.

pub mod drives;
pub mod permissions;
pub mod repair_tool;
pub mod storage;

pub use drives::list_removable_drives;
pub use permissions::is_elevated;
pub use repair_tool::{Chkdsk, RepairExit, RepairProcess, RepairTool};
pub use storage::{FixedStorage, StorageProbe, SystemStorage};
