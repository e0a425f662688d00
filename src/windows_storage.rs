use std::ffi::c_void;
use std::mem::{offset_of, size_of};

use windows::core::PCWSTR;
use windows::Win32::Foundation::{CloseHandle, GENERIC_READ, HANDLE, MAX_PATH};
use windows::Win32::Storage::FileSystem::{
    CreateFileW, GetDiskFreeSpaceExW, GetLogicalDrives, GetVolumeNameForVolumeMountPointW,
    GetVolumePathNamesForVolumeNameW, FILE_SHARE_READ, FILE_SHARE_WRITE,
    IOCTL_VOLUME_GET_VOLUME_DISK_EXTENTS, OPEN_EXISTING,
};
use windows::Win32::System::Ioctl::{
    DISK_EXTENT, DISK_GEOMETRY_EX, IOCTL_DISK_GET_DRIVE_GEOMETRY_EX, VOLUME_DISK_EXTENTS,
};
use windows::Win32::System::IO::DeviceIoControl;

use crate::storage::{ExtentQuery, StorageBackend};
use crate::{
    DiskExtent, DiskGeometry, VolumeSpace, ERROR_INSUFFICIENT_BUFFER, ERROR_MORE_DATA,
};

/// Buffer length for volume GUID paths
const VOLUME_NAME_LEN: usize = MAX_PATH as usize + 1;

/// Attempts at listing volume path names; the second uses the length the
/// first one reported.
const PATH_NAMES_ATTEMPTS: usize = 2;

/// The storage backend of the running Windows system.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsStorage;

/// An open volume or drive handle, closed on drop.
#[derive(Debug)]
pub struct DeviceHandle(HANDLE);

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

/// Null-terminated UTF-16 copy of a string
pub(super) fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Extract the Win32 error code from an `HRESULT_FROM_WIN32` error
pub(super) fn win32_code(hresult: i32) -> u32 {
    let hresult = hresult as u32;
    if hresult & 0xFFFF_0000 == 0x8007_0000 {
        hresult & 0xFFFF
    } else {
        hresult
    }
}

/// Split a double-null-terminated string list
pub(super) fn parse_multi_sz(buffer: &[u16]) -> Vec<String> {
    buffer
        .split(|&c| c == 0)
        .take_while(|s| !s.is_empty())
        .map(String::from_utf16_lossy)
        .collect()
}

/// Byte size of a `VOLUME_DISK_EXTENTS` holding `capacity` extents
pub(super) fn extents_buffer_len(capacity: u32) -> usize {
    offset_of!(VOLUME_DISK_EXTENTS, Extents) + capacity.max(1) as usize * size_of::<DISK_EXTENT>()
}

impl StorageBackend for WindowsStorage {
    type Handle = DeviceHandle;

    fn logical_drives(&self) -> u32 {
        unsafe { GetLogicalDrives() }
    }

    fn volume_name_for_mount_point(&self, mount_point: &str) -> Result<String, u32> {
        let mount_point = to_wide(mount_point);
        let mut buffer = [0u16; VOLUME_NAME_LEN];

        unsafe { GetVolumeNameForVolumeMountPointW(PCWSTR(mount_point.as_ptr()), &mut buffer) }
            .map_err(|e| win32_code(e.code().0))?;

        let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
        Ok(String::from_utf16_lossy(&buffer[..len]))
    }

    fn volume_path_names(&self, volume_name: &str) -> Result<Vec<String>, u32> {
        let volume_name = to_wide(volume_name);
        let mut buffer = vec![0u16; VOLUME_NAME_LEN];
        let mut code = ERROR_MORE_DATA;

        for _ in 0..PATH_NAMES_ATTEMPTS {
            let mut needed = 0u32;
            let result = unsafe {
                GetVolumePathNamesForVolumeNameW(
                    PCWSTR(volume_name.as_ptr()),
                    Some(buffer.as_mut_slice()),
                    &mut needed,
                )
            };
            match result {
                Ok(()) => return Ok(parse_multi_sz(&buffer)),
                Err(e) => {
                    code = win32_code(e.code().0);
                    if code != ERROR_MORE_DATA {
                        return Err(code);
                    }
                    buffer = vec![0u16; (needed as usize).max(buffer.len() + 1)];
                }
            }
        }

        Err(code)
    }

    fn open(&self, path: &str) -> Result<DeviceHandle, u32> {
        let path = to_wide(path);
        let handle = unsafe {
            CreateFileW(
                PCWSTR(path.as_ptr()),
                GENERIC_READ.0,
                // Mounted volumes are held open for writing by the system.
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                None,
                OPEN_EXISTING,
                Default::default(),
                None,
            )
        }
        .map_err(|e| win32_code(e.code().0))?;

        Ok(DeviceHandle(handle))
    }

    fn query_disk_extents(&self, handle: &DeviceHandle, capacity: u32) -> ExtentQuery {
        let capacity = capacity.max(1);
        let len = extents_buffer_len(capacity);
        // u64 storage keeps the LARGE_INTEGER fields aligned.
        let mut buffer = vec![0u64; len.div_ceil(size_of::<u64>())];
        let mut bytes_returned = 0u32;

        let result = unsafe {
            DeviceIoControl(
                handle.0,
                IOCTL_VOLUME_GET_VOLUME_DISK_EXTENTS,
                None,
                0,
                Some(buffer.as_mut_ptr() as *mut c_void),
                len as u32,
                Some(&mut bytes_returned),
                None,
            )
        };

        let base = buffer.as_ptr() as *const u8;
        // NumberOfDiskExtents is filled in on success and on ERROR_MORE_DATA.
        let extent_count = unsafe { std::ptr::read(base as *const u32) };

        match result {
            Ok(()) => {
                let first =
                    unsafe { base.add(offset_of!(VOLUME_DISK_EXTENTS, Extents)) as *const DISK_EXTENT };
                let extents = (0..extent_count.min(capacity) as usize)
                    .map(|i| {
                        let raw = unsafe { std::ptr::read(first.add(i)) };
                        DiskExtent::new(
                            raw.DiskNumber,
                            raw.StartingOffset as u64,
                            raw.ExtentLength as u64,
                        )
                    })
                    .collect();
                ExtentQuery::Complete(extents)
            }
            Err(e) => match win32_code(e.code().0) {
                ERROR_MORE_DATA | ERROR_INSUFFICIENT_BUFFER if extent_count > 0 => {
                    ExtentQuery::MoreData { extent_count }
                }
                code => ExtentQuery::Failed(code),
            },
        }
    }

    fn query_geometry(&self, handle: &DeviceHandle) -> Result<DiskGeometry, u32> {
        let mut geometry: DISK_GEOMETRY_EX = unsafe { std::mem::zeroed() };
        let mut bytes_returned = 0u32;

        unsafe {
            DeviceIoControl(
                handle.0,
                IOCTL_DISK_GET_DRIVE_GEOMETRY_EX,
                None,
                0,
                Some(&mut geometry as *mut DISK_GEOMETRY_EX as *mut c_void),
                size_of::<DISK_GEOMETRY_EX>() as u32,
                Some(&mut bytes_returned),
                None,
            )
        }
        .map_err(|e| win32_code(e.code().0))?;

        Ok(DiskGeometry {
            media_type: geometry.Geometry.MediaType.0,
            disk_size: geometry.DiskSize as u64,
        })
    }

    fn disk_free_space(&self, root: &str) -> Result<VolumeSpace, u32> {
        let root = to_wide(root);
        let mut free_caller = 0u64;
        let mut total = 0u64;
        let mut free_total = 0u64;

        unsafe {
            GetDiskFreeSpaceExW(
                PCWSTR(root.as_ptr()),
                Some(&mut free_caller as *mut u64),
                Some(&mut total as *mut u64),
                Some(&mut free_total as *mut u64),
            )
        }
        .map_err(|e| win32_code(e.code().0))?;

        Ok(VolumeSpace::new(total, free_caller))
    }
}
