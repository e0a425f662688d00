//! Volume enumeration and physical-disk extent resolution for Windows.
//!
//! Every mounted drive letter is resolved to its volume GUID path and the
//! extents backing it on physical disks; physical drives can be opened to read
//! their geometry. All operations take a [`StorageBackend`]; on Windows the
//! unsuffixed functions use the running system's [`WindowsStorage`].

mod disks;
mod message;
mod models;
mod storage;
mod volumes;
#[cfg(windows)]
mod windows_storage;

#[cfg(test)]
mod mock;

pub use disks::disk_type_from_media;
pub use message::{format_native_error, LANG_NEUTRAL_DEFAULT};
pub use models::*;
pub use storage::{ExtentQuery, StorageBackend};
pub use volumes::*;
#[cfg(windows)]
pub use windows_storage::{DeviceHandle, WindowsStorage};
