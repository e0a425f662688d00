mod disk;
mod disk_error;
mod volume;

pub use disk::{Disk, DiskGeometry, DiskType};
pub use disk_error::{
    DiskToolsError, DiskToolsErrorKind, ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND,
    ERROR_INSUFFICIENT_BUFFER, ERROR_MORE_DATA, ERROR_SHARING_VIOLATION,
};
pub use volume::{extents_to_string, DiskExtent, VolumeInfo, VolumeSpace};
