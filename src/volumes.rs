//! Volume enumeration and disk extent resolution.
//!
//! Volumes are discovered through the legacy drive-letter space: every letter
//! set in the logical drive bitmask is resolved to its volume GUID path, and
//! the extents of that volume are read with
//! `IOCTL_VOLUME_GET_VOLUME_DISK_EXTENTS`. The extent count is unknown up
//! front, so the query starts with room for a single extent and grows the
//! buffer to the count the OS reports back.

use tracing::{debug, warn};

use crate::storage::{ExtentQuery, StorageBackend};
use crate::{DiskExtent, DiskToolsError, VolumeInfo, VolumeSpace, ERROR_MORE_DATA};

/// Number of drive letters, `A:` through `Z:`.
pub const DRIVE_LETTER_COUNT: u32 = 26;

/// Upper bound on extent queries per volume: the single-extent query plus
/// three resized retries.
pub const MAX_EXTENT_QUERY_ATTEMPTS: u32 = 4;

const DRIVE_LETTER_MASK: u32 = (1 << DRIVE_LETTER_COUNT) - 1;

/// Options controlling [`list_volumes_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Abort on the first volume that fails to resolve instead of skipping it.
    pub stop_on_error: bool,
    /// Maximum number of extent queries made for one volume.
    pub max_extent_attempts: u32,
}

impl Default for ListOptions {
    fn default() -> Self {
        ListOptions {
            stop_on_error: true,
            max_extent_attempts: MAX_EXTENT_QUERY_ATTEMPTS,
        }
    }
}

impl ListOptions {
    pub fn stop_on_error(stop_on_error: bool) -> Self {
        ListOptions {
            stop_on_error,
            ..Default::default()
        }
    }
}

/// Returns the drive letters set in a logical drive bitmask, in order.
pub fn drive_letters(mask: u32) -> impl Iterator<Item = char> {
    ('A'..='Z')
        .enumerate()
        .filter(move |(bit, _)| mask & (1 << bit) != 0)
        .map(|(_, letter)| letter)
}

fn mount_point_for(letter: char) -> String {
    format!("{letter}:\\")
}

/// Counts the drive letters currently in use.
pub fn count_volumes_with<B: StorageBackend>(backend: &B) -> usize {
    (backend.logical_drives() & DRIVE_LETTER_MASK).count_ones() as usize
}

/// Lists every volume mounted on a drive letter, in drive letter order.
///
/// With `options.stop_on_error` unset, volumes that fail to resolve are left
/// out of the result instead of failing the whole call.
pub fn list_volumes_with<B: StorageBackend>(
    backend: &B,
    options: &ListOptions,
) -> Result<Vec<VolumeInfo>, DiskToolsError> {
    let mask = backend.logical_drives();
    let mut volumes = Vec::new();

    for letter in drive_letters(mask) {
        match resolve_drive_letter(backend, letter, options.max_extent_attempts) {
            Ok(volume) => {
                debug!(
                    drive = %letter,
                    volume = volume.identifier(),
                    extents = volume.extent_count(),
                    "Resolved volume"
                );
                volumes.push(volume);
            }
            Err(e) if !options.stop_on_error => {
                warn!(drive = %letter, "Skipping volume: {e}");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(volumes)
}

/// Resolves the volume mounted on a single drive letter.
///
/// Fails with `NotFound` if the letter is not in use and with `Unknown` if it
/// is not a letter at all.
pub fn volume_for_drive_letter_with<B: StorageBackend>(
    backend: &B,
    letter: char,
) -> Result<VolumeInfo, DiskToolsError> {
    if !letter.is_ascii_alphabetic() {
        return Err(DiskToolsError::unknown(
            "Not a drive letter",
            letter.to_string(),
        ));
    }
    let letter = letter.to_ascii_uppercase();
    let bit = letter as u32 - 'A' as u32;

    if backend.logical_drives() & (1 << bit) == 0 {
        return Err(DiskToolsError::not_found(
            "Drive letter is not in use",
            mount_point_for(letter),
        ));
    }

    resolve_drive_letter(backend, letter, MAX_EXTENT_QUERY_ATTEMPTS)
}

fn resolve_drive_letter<B: StorageBackend>(
    backend: &B,
    letter: char,
    max_attempts: u32,
) -> Result<VolumeInfo, DiskToolsError> {
    let drive_path = mount_point_for(letter);

    let volume_name = backend
        .volume_name_for_mount_point(&drive_path)
        .map_err(|code| {
            DiskToolsError::native("Failed to get volume name from drive path", code, &drive_path)
        })?;

    let path_names = backend.volume_path_names(&volume_name).map_err(|code| {
        DiskToolsError::native("Failed to get drive path from volume name", code, &volume_name)
    })?;

    let mount_point = path_names
        .into_iter()
        .next()
        .ok_or_else(|| DiskToolsError::not_found("Volume has no mount point", &volume_name))?;

    Ok(volume_info(backend, &volume_name, max_attempts)?.with_mount_point(mount_point))
}

/// Reads the extents of a volume given its GUID path
/// (e.g. `\\?\Volume{1234-5678}\`); a trailing `\` is stripped.
///
/// The returned `VolumeInfo` has no mount point, as none was looked up.
pub fn get_volume_info_with<B: StorageBackend>(
    backend: &B,
    volume_name: &str,
) -> Result<VolumeInfo, DiskToolsError> {
    volume_info(backend, volume_name, MAX_EXTENT_QUERY_ATTEMPTS)
}

fn volume_info<B: StorageBackend>(
    backend: &B,
    volume_name: &str,
    max_attempts: u32,
) -> Result<VolumeInfo, DiskToolsError> {
    let identifier = volume_name.strip_suffix('\\').unwrap_or(volume_name);

    let handle = backend
        .open(identifier)
        .map_err(|code| DiskToolsError::native("Failed to open volume", code, identifier))?;
    let extents = resolve_extents(backend, &handle, identifier, max_attempts)?;
    drop(handle);

    Ok(VolumeInfo::new(identifier.to_string(), String::new(), extents))
}

/// Runs the extent query protocol on an open volume handle.
///
/// The first query has room for one extent, which is all a simple volume
/// needs. When the OS answers with "more data", the buffer is resized to the
/// extent count it reported and the query repeated, at most `max_attempts`
/// times in total.
pub fn resolve_extents<B: StorageBackend>(
    backend: &B,
    handle: &B::Handle,
    identifier: &str,
    max_attempts: u32,
) -> Result<Vec<DiskExtent>, DiskToolsError> {
    let mut capacity = 1u32;

    for attempt in 1..=max_attempts.max(1) {
        match backend.query_disk_extents(handle, capacity) {
            ExtentQuery::Complete(extents) => return Ok(extents),
            ExtentQuery::MoreData { extent_count } => {
                debug!(
                    volume = identifier,
                    attempt,
                    capacity,
                    extent_count,
                    "Extent buffer too small"
                );
                // A count that does not exceed the current buffer would repeat
                // the same query forever.
                capacity = extent_count.max(capacity.saturating_add(1));
            }
            ExtentQuery::Failed(code) => {
                return Err(DiskToolsError::native(
                    "Failed to get volume disk extents",
                    code,
                    identifier,
                ))
            }
        }
    }

    warn!(
        volume = identifier,
        max_attempts, "Extent count kept changing between queries"
    );
    Err(DiskToolsError::native(
        "Failed to get volume disk extents",
        ERROR_MORE_DATA,
        identifier,
    ))
}

/// Reads the total, free and used space of a mounted volume.
pub fn volume_space_with<B: StorageBackend>(
    backend: &B,
    mount_point: &str,
) -> Result<VolumeSpace, DiskToolsError> {
    backend
        .disk_free_space(mount_point)
        .map_err(|code| DiskToolsError::native("Failed to get volume free space", code, mount_point))
}

#[cfg(windows)]
mod system {
    use super::*;
    use crate::WindowsStorage;

    /// Counts the drive letters currently in use on this system.
    pub fn count_volumes() -> usize {
        count_volumes_with(&WindowsStorage)
    }

    /// Lists every volume mounted on a drive letter.
    ///
    /// # Arguments
    /// * `stop_on_exception` - Fail on the first volume that cannot be
    ///   resolved; when false, such volumes are skipped
    ///
    /// # Examples
    /// ```no_run
    /// use win_volume_extents::list_volumes;
    ///
    /// for volume in list_volumes(false)? {
    ///     println!("{volume}");
    /// }
    /// # Ok::<(), win_volume_extents::DiskToolsError>(())
    /// ```
    pub fn list_volumes(stop_on_exception: bool) -> Result<Vec<VolumeInfo>, DiskToolsError> {
        list_volumes_with(&WindowsStorage, &ListOptions::stop_on_error(stop_on_exception))
    }

    /// Reads the extents of a volume of this system given its GUID path.
    ///
    /// # Arguments
    /// * `volume_name` - Volume GUID path (e.g. `\\?\Volume{1234-5678}\`);
    ///   a trailing `\` is stripped
    pub fn get_volume_info(volume_name: &str) -> Result<VolumeInfo, DiskToolsError> {
        get_volume_info_with(&WindowsStorage, volume_name)
    }

    /// Resolves the volume mounted on one drive letter of this system.
    ///
    /// # Examples
    /// ```no_run
    /// use win_volume_extents::volume_for_drive_letter;
    ///
    /// let system = volume_for_drive_letter('C')?;
    /// assert_eq!(system.mount_point(), "C:\\");
    /// # Ok::<(), win_volume_extents::DiskToolsError>(())
    /// ```
    pub fn volume_for_drive_letter(letter: char) -> Result<VolumeInfo, DiskToolsError> {
        volume_for_drive_letter_with(&WindowsStorage, letter)
    }

    /// Reads the total, free and used space of a mounted volume of this system.
    pub fn volume_space(mount_point: &str) -> Result<VolumeSpace, DiskToolsError> {
        volume_space_with(&WindowsStorage, mount_point)
    }
}

#[cfg(windows)]
pub use system::*;
