//! This module provides structures for representing physical disk geometry.
//!
//! It contains the `Disk` struct, built from a single drive-geometry query,
//! and the `DiskType` enum that classifies the media behind it.

use std::fmt;

/// Represents the kind of media a disk holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum DiskType {
    /// Media type could not be classified
    #[default]
    Unknown,
    /// Removable media other than floppy (e.g. USB sticks)
    Removable,
    /// Fixed hard disk media
    Fixed,
    /// Remote (network) drive
    Network,
    /// CD-ROM or other optical drive
    CdRom,
    /// RAM disk
    RamDisk,
}

impl DiskType {
    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Removable => "Removable",
            Self::Fixed => "Fixed",
            Self::Network => "Network",
            Self::CdRom => "CD-ROM",
            Self::RamDisk => "RAM Disk",
        }
    }
}

impl fmt::Display for DiskType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw result of a drive geometry query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskGeometry {
    /// `MEDIA_TYPE` value reported by the driver
    pub media_type: i32,
    /// Total size of the disk in bytes
    pub disk_size: u64,
}

/// Represents a physical drive.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Disk {
    /// Physical device path (e.g., "\\\\.\\PhysicalDrive0")
    drive_path: String,
    /// Classification of the media
    disk_type: DiskType,
    /// Total capacity in bytes
    total_size: u64,
}

impl Disk {
    /// Creates a new instance of `Disk`.
    ///
    /// # Examples
    ///
    /// ```
    /// use win_volume_extents::{Disk, DiskType};
    ///
    /// let disk = Disk::new(
    ///     String::from("\\\\.\\PhysicalDrive0"),
    ///     DiskType::Fixed,
    ///     1000204886016,  // 1TB in bytes
    /// );
    /// assert_eq!(disk.disk_type().label(), "Fixed");
    /// ```
    pub fn new(drive_path: String, disk_type: DiskType, total_size: u64) -> Disk {
        Disk {
            drive_path,
            disk_type,
            total_size,
        }
    }

    /// Returns the physical device path the disk was opened through.
    pub fn drive_path(&self) -> &str {
        &self.drive_path
    }

    pub fn disk_type(&self) -> DiskType {
        self.disk_type
    }

    /// Returns the total disk capacity in bytes.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }
}
