//! Achievement persistence: a single-key store holding either the record
//! list as JSON or the secret-reset sentinel.

use super::types::AchievementRecord;
use crate::error::Result;
use crate::utils::persistence::{data_dir, key_path};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Durable storage for one string value.
///
/// Mirrors a browser's local storage entry: read, overwrite, delete.
pub trait AchievementStore {
    /// Current value, or `None` if nothing is stored.
    fn read(&self) -> Result<Option<String>>;
    fn write(&mut self, value: &str) -> Result<()>;
    fn remove(&mut self) -> Result<()>;
}

/// Store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for `key` inside `dir` (`<dir>/<key>.json`).
    pub fn in_dir(dir: &Path, key: &str) -> Self {
        Self::new(key_path(dir, key))
    }

    /// Store for `key` in ~/.portfolio/.
    pub fn default_location(key: &str) -> Result<Self> {
        Ok(Self::in_dir(&data_dir()?, key))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AchievementStore for FileStore {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, value: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, value)?;
        Ok(())
    }

    fn remove(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store. Clones share the same slot, so a test can hand one clone
/// to the engine and inspect or tamper with the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Rc<RefCell<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Rc::new(RefCell::new(Some(value.into()))),
        }
    }

    pub fn value(&self) -> Option<String> {
        self.value.borrow().clone()
    }
}

impl AchievementStore for MemoryStore {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.value())
    }

    fn write(&mut self, value: &str) -> Result<()> {
        *self.value.borrow_mut() = Some(value.to_string());
        Ok(())
    }

    fn remove(&mut self) -> Result<()> {
        *self.value.borrow_mut() = None;
        Ok(())
    }
}

/// Decoded contents of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredState {
    /// Nothing stored, or nothing usable.
    Empty,
    /// The sentinel: a qualifying reset happened and the reset-cascade
    /// achievement is owed on this load.
    PendingSecretReset,
    Records(Vec<AchievementRecord>),
}

impl StoredState {
    /// Interpret a raw stored value. Anything that is neither the sentinel nor
    /// a valid record list counts as empty.
    pub fn decode(raw: Option<&str>, sentinel: &str) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return StoredState::Empty;
        };
        if raw == sentinel {
            return StoredState::PendingSecretReset;
        }
        match serde_json::from_str::<Vec<AchievementRecord>>(raw) {
            Ok(records) => StoredState::Records(records),
            Err(e) => {
                tracing::warn!(error = %e, "stored achievements are unreadable, reseeding");
                StoredState::Empty
            }
        }
    }
}

/// Serialize the record list the way it is stored.
pub fn encode_records(records: &[AchievementRecord]) -> Result<String> {
    Ok(serde_json::to_string(records)?)
}
