//! Key-value slots the observation store persists into.

use crate::error::Result;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A key-value backend holding whole serialized blobs.
///
/// Writes replace the previous value for the key in one step.
pub trait Slot {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, blob: &str) -> Result<()>;
}

impl<T: Slot + ?Sized> Slot for Box<T> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, blob: &str) -> Result<()> {
        (**self).write(key, blob)
    }
}

/// In-process slot, lost when dropped.
#[derive(Debug, Default)]
pub struct MemorySlot {
    values: RefCell<HashMap<String, String>>,
}

impl Slot for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, blob: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Slot for FileSlot {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a sibling temp file, then rename over the target so readers
    /// never see a half-written blob.
    fn write(&self, key: &str, blob: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let target = self.path_for(key);
        let staging = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&staging, blob)?;
        fs::rename(&staging, &target)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_slot_round_trip() {
        let slot = MemorySlot::default();
        assert_eq!(slot.read("k").unwrap(), None);
        slot.write("k", "[1]").unwrap();
        slot.write("k", "[2]").unwrap();
        assert_eq!(slot.read("k").unwrap().as_deref(), Some("[2]"));
    }

    #[test]
    fn file_slot_missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let slot = FileSlot::new(tmp.path());
        assert_eq!(slot.read("absent").unwrap(), None);
    }

    #[test]
    fn file_slot_creates_directory_and_replaces() {
        let tmp = TempDir::new().unwrap();
        let slot = FileSlot::new(tmp.path().join("nested").join("data"));
        slot.write("obs", "[]").unwrap();
        slot.write("obs", "[{\"a\":1}]").unwrap();
        assert_eq!(slot.read("obs").unwrap().as_deref(), Some("[{\"a\":1}]"));
        assert!(slot.path_for("obs").exists());
        assert!(!slot.dir().join("obs.json.tmp").exists());
    }
}
