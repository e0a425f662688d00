//! This module provides structures for representing mounted volumes and the
//! physical-disk extents that back them.
//!
//! A volume is identified by its `\\?\Volume{GUID}` name, which is stable
//! across reboots and drive letter changes. Each volume maps onto one or more
//! extents: contiguous byte ranges on a physical disk. Simple volumes have a
//! single extent; spanned and striped volumes have several.

use std::fmt;

/// A contiguous byte range on one physical disk backing part of a volume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct DiskExtent {
    /// Number of the physical disk (`\\.\PhysicalDriveN`)
    disk_number: u32,
    /// Offset of the extent from the start of the disk, in bytes
    starting_offset: u64,
    /// Length of the extent in bytes
    length: u64,
}

impl DiskExtent {
    /// Creates a new `DiskExtent`.
    ///
    /// # Examples
    ///
    /// ```
    /// use win_volume_extents::DiskExtent;
    ///
    /// let extent = DiskExtent::new(0, 1_048_576, 512_000_000_000);
    /// assert_eq!(extent.to_string(), "Disk: 0, Offset: 1048576, Length: 512000000000");
    /// ```
    pub fn new(disk_number: u32, starting_offset: u64, length: u64) -> Self {
        DiskExtent {
            disk_number,
            starting_offset,
            length,
        }
    }

    pub fn disk_number(&self) -> u32 {
        self.disk_number
    }

    pub fn starting_offset(&self) -> u64 {
        self.starting_offset
    }

    pub fn length(&self) -> u64 {
        self.length
    }
}

impl fmt::Display for DiskExtent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Disk: {}, Offset: {}, Length: {}",
            self.disk_number, self.starting_offset, self.length
        )
    }
}

/// Renders a sequence of extents, separated by `", "`.
pub fn extents_to_string(extents: &[DiskExtent]) -> String {
    extents
        .iter()
        .map(DiskExtent::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A point-in-time snapshot of one mounted volume and its extents.
///
/// The extents are kept in the order the OS reported them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct VolumeInfo {
    /// Volume GUID path without the trailing separator
    identifier: String,
    /// First mount point of the volume (e.g. "D:\\"), empty if not looked up
    mount_point: String,
    /// Physical extents backing the volume
    extents: Vec<DiskExtent>,
}

impl VolumeInfo {
    /// Creates a new `VolumeInfo`.
    ///
    /// # Arguments
    ///
    /// * `identifier` - Volume GUID path (e.g. "\\\\?\\Volume{...}")
    /// * `mount_point` - Drive letter path the volume was found through
    /// * `extents` - Extents backing the volume, in OS order
    pub fn new(identifier: String, mount_point: String, extents: Vec<DiskExtent>) -> Self {
        VolumeInfo {
            identifier,
            mount_point,
            extents,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn mount_point(&self) -> &str {
        &self.mount_point
    }

    pub fn extents(&self) -> &[DiskExtent] {
        &self.extents
    }

    /// Returns the number of extents; 1 for a simple volume.
    pub fn extent_count(&self) -> usize {
        self.extents.len()
    }

    pub(crate) fn with_mount_point(mut self, mount_point: String) -> Self {
        self.mount_point = mount_point;
        self
    }
}

impl fmt::Display for VolumeInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Volume: {}, Path: {}, Extents: {}",
            self.identifier,
            self.mount_point,
            extents_to_string(&self.extents)
        )
    }
}

/// Space usage of a mounted volume, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct VolumeSpace {
    total: u64,
    free: u64,
}

impl VolumeSpace {
    pub fn new(total: u64, free: u64) -> Self {
        VolumeSpace { total, free }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Returns the bytes available to the calling user.
    pub fn free(&self) -> u64 {
        self.free
    }

    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.free)
    }
}
