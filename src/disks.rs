//! Physical drive geometry.

use tracing::debug;

use crate::storage::StorageBackend;
use crate::{Disk, DiskToolsError, DiskType};

/// `MEDIA_TYPE` values reported by `IOCTL_DISK_GET_DRIVE_GEOMETRY_EX`
pub(crate) const MEDIA_TYPE_REMOVABLE: i32 = 11;
pub(crate) const MEDIA_TYPE_FIXED: i32 = 12;

/// Get disk type from a geometry media type
pub fn disk_type_from_media(media_type: i32) -> DiskType {
    match media_type {
        MEDIA_TYPE_FIXED => DiskType::Fixed,
        MEDIA_TYPE_REMOVABLE => DiskType::Removable,
        _ => DiskType::Unknown,
    }
}

impl Disk {
    /// Opens a physical drive (e.g. `\\.\PhysicalDrive0`) and reads its
    /// geometry.
    ///
    /// The drive handle is closed before returning.
    pub fn open_with<B: StorageBackend>(
        backend: &B,
        drive_path: &str,
    ) -> Result<Disk, DiskToolsError> {
        let handle = backend
            .open(drive_path)
            .map_err(|code| DiskToolsError::native("Failed to open drive", code, drive_path))?;
        let geometry = backend.query_geometry(&handle).map_err(|code| {
            DiskToolsError::native("Failed to get drive geometry", code, drive_path)
        })?;

        let disk_type = disk_type_from_media(geometry.media_type);
        debug!(
            drive = drive_path,
            disk_type = disk_type.label(),
            size = geometry.disk_size,
            "Read drive geometry"
        );

        Ok(Disk::new(
            drive_path.to_string(),
            disk_type,
            geometry.disk_size,
        ))
    }

    /// Opens a physical drive of this system and reads its geometry.
    ///
    /// # Examples
    /// ```no_run
    /// use win_volume_extents::Disk;
    ///
    /// let disk = Disk::open("\\\\.\\PhysicalDrive0")?;
    /// println!("{}: {} bytes", disk.disk_type(), disk.total_size());
    /// # Ok::<(), win_volume_extents::DiskToolsError>(())
    /// ```
    #[cfg(windows)]
    pub fn open(drive_path: &str) -> Result<Disk, DiskToolsError> {
        Disk::open_with(&crate::WindowsStorage, drive_path)
    }
}
