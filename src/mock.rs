//! Scripted [`StorageBackend`] for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::storage::{ExtentQuery, StorageBackend};
use crate::{DiskExtent, DiskGeometry, VolumeSpace, ERROR_FILE_NOT_FOUND};

#[derive(Default)]
pub(crate) struct MockStorage {
    drives: u32,
    volume_names: HashMap<String, Result<String, u32>>,
    path_names: HashMap<String, Vec<String>>,
    open_errors: HashMap<String, u32>,
    query_errors: HashMap<String, u32>,
    /// Extent layout seen by each successive query; the last one repeats.
    layouts: RefCell<HashMap<String, VecDeque<Vec<DiskExtent>>>>,
    geometry: HashMap<String, Result<DiskGeometry, u32>>,
    space: HashMap<String, VolumeSpace>,
    queries: RefCell<Vec<(String, u32)>>,
    opened: Cell<usize>,
    closed: Rc<Cell<usize>>,
}

pub(crate) struct MockHandle {
    path: String,
    closed: Rc<Cell<usize>>,
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.closed.set(self.closed.get() + 1);
    }
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts `volume` (given without trailing separator) on `letter`.
    pub fn with_volume(mut self, letter: char, volume: &str, extents: Vec<DiskExtent>) -> Self {
        let mount_point = format!("{letter}:\\");
        let volume_name = format!("{volume}\\");
        self.drives |= 1 << (letter as u32 - 'A' as u32);
        self.volume_names
            .insert(mount_point.clone(), Ok(volume_name.clone()));
        self.path_names.insert(volume_name, vec![mount_point]);
        self.layouts
            .get_mut()
            .insert(volume.to_string(), VecDeque::from([extents]));
        self
    }

    pub fn with_raw_drive_bits(mut self, bits: u32) -> Self {
        self.drives |= bits;
        self
    }

    pub fn with_extent_layouts(self, volume: &str, layouts: Vec<Vec<DiskExtent>>) -> Self {
        self.layouts
            .borrow_mut()
            .insert(volume.to_string(), layouts.into());
        self
    }

    pub fn with_path_names(mut self, volume: &str, names: Vec<String>) -> Self {
        self.path_names.insert(format!("{volume}\\"), names);
        self
    }

    pub fn with_mount_point_error(mut self, letter: char, code: u32) -> Self {
        self.volume_names.insert(format!("{letter}:\\"), Err(code));
        self
    }

    pub fn with_open_error(mut self, path: &str, code: u32) -> Self {
        self.open_errors.insert(path.to_string(), code);
        self
    }

    pub fn with_query_error(mut self, volume: &str, code: u32) -> Self {
        self.query_errors.insert(volume.to_string(), code);
        self
    }

    pub fn with_geometry(mut self, drive: &str, geometry: Result<DiskGeometry, u32>) -> Self {
        self.geometry.insert(drive.to_string(), geometry);
        self
    }

    pub fn with_space(mut self, root: &str, space: VolumeSpace) -> Self {
        self.space.insert(root.to_string(), space);
        self
    }

    /// Every extent query made so far, as `(volume, capacity)`.
    pub fn queries(&self) -> Vec<(String, u32)> {
        self.queries.borrow().clone()
    }

    pub fn opened_handles(&self) -> usize {
        self.opened.get()
    }

    pub fn closed_handles(&self) -> usize {
        self.closed.get()
    }
}

impl StorageBackend for MockStorage {
    type Handle = MockHandle;

    fn logical_drives(&self) -> u32 {
        self.drives
    }

    fn volume_name_for_mount_point(&self, mount_point: &str) -> Result<String, u32> {
        self.volume_names
            .get(mount_point)
            .cloned()
            .unwrap_or(Err(ERROR_FILE_NOT_FOUND))
    }

    fn volume_path_names(&self, volume_name: &str) -> Result<Vec<String>, u32> {
        self.path_names
            .get(volume_name)
            .cloned()
            .ok_or(ERROR_FILE_NOT_FOUND)
    }

    fn open(&self, path: &str) -> Result<MockHandle, u32> {
        if let Some(code) = self.open_errors.get(path) {
            return Err(*code);
        }
        let known =
            self.layouts.borrow().contains_key(path) || self.geometry.contains_key(path);
        if !known {
            return Err(ERROR_FILE_NOT_FOUND);
        }

        self.opened.set(self.opened.get() + 1);
        Ok(MockHandle {
            path: path.to_string(),
            closed: Rc::clone(&self.closed),
        })
    }

    fn query_disk_extents(&self, handle: &MockHandle, capacity: u32) -> ExtentQuery {
        self.queries
            .borrow_mut()
            .push((handle.path.clone(), capacity));

        if let Some(code) = self.query_errors.get(&handle.path) {
            return ExtentQuery::Failed(*code);
        }

        let mut layouts = self.layouts.borrow_mut();
        let Some(queue) = layouts.get_mut(&handle.path) else {
            return ExtentQuery::Failed(ERROR_FILE_NOT_FOUND);
        };
        let layout = if queue.len() > 1 {
            queue.pop_front().unwrap_or_default()
        } else {
            queue.front().cloned().unwrap_or_default()
        };

        if layout.len() as u32 <= capacity {
            ExtentQuery::Complete(layout)
        } else {
            ExtentQuery::MoreData {
                extent_count: layout.len() as u32,
            }
        }
    }

    fn query_geometry(&self, handle: &MockHandle) -> Result<DiskGeometry, u32> {
        self.geometry
            .get(&handle.path)
            .cloned()
            .unwrap_or(Err(ERROR_FILE_NOT_FOUND))
    }

    fn disk_free_space(&self, root: &str) -> Result<VolumeSpace, u32> {
        self.space.get(root).copied().ok_or(ERROR_FILE_NOT_FOUND)
    }
}
