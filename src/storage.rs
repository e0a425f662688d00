//! The OS primitives the volume and disk operations are built on.
//!
//! Every primitive reports failure as the raw Win32 error code; the callers
//! attach the message and context when they turn it into a
//! [`DiskToolsError`](crate::DiskToolsError).

use crate::{DiskExtent, DiskGeometry, VolumeSpace};

/// Outcome of one extent query made with a buffer holding `capacity` extents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtentQuery {
    /// The buffer was large enough; extents in the order the OS reported them.
    Complete(Vec<DiskExtent>),
    /// The buffer was too small; the OS reported how many extents there are.
    MoreData { extent_count: u32 },
    /// The query failed with a Win32 error code.
    Failed(u32),
}

/// Access to the storage management calls of the host.
///
/// Handles returned by [`open`](StorageBackend::open) are closed when dropped.
pub trait StorageBackend {
    type Handle;

    /// Bitmask of the drive letters in use, bit 0 being `A:`.
    fn logical_drives(&self) -> u32;

    /// Resolves a mount point such as `C:\` to its volume GUID path.
    fn volume_name_for_mount_point(&self, mount_point: &str) -> Result<String, u32>;

    /// Lists the mount points of a volume, in the order the OS returns them.
    fn volume_path_names(&self, volume_name: &str) -> Result<Vec<String>, u32>;

    /// Opens a volume or physical drive read-only, sharing reads.
    fn open(&self, path: &str) -> Result<Self::Handle, u32>;

    /// Asks for the disk extents of an open volume into a buffer sized for
    /// `capacity` extents.
    fn query_disk_extents(&self, handle: &Self::Handle, capacity: u32) -> ExtentQuery;

    /// Reads the geometry of an open physical drive.
    fn query_geometry(&self, handle: &Self::Handle) -> Result<DiskGeometry, u32>;

    /// Reads total and caller-available bytes of a mounted volume.
    fn disk_free_space(&self, root: &str) -> Result<VolumeSpace, u32>;
}
