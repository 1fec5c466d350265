use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::Value;

use crate::error::Result;

pub const STICKIES_DIR: &str = ".stickies";
pub const DATA_FILE: &str = "data.json";

/// Opaque blob persistence for the settings record.
pub trait DataStore {
    /// Returns `None` when nothing has been saved yet.
    fn load_data(&self) -> Result<Option<Value>>;

    fn save_data(&mut self, data: &Value) -> Result<()>;
}

/// Stores the record as pretty JSON under `<root>/.stickies/data.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: &Path) -> Self {
        Self {
            path: root.join(STICKIES_DIR).join(DATA_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the data file.
    pub fn data_dir(&self) -> Option<&Path> {
        self.path.parent()
    }
}

impl DataStore for JsonFileStore {
    fn load_data(&self) -> Result<Option<Value>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn save_data(&mut self, data: &Value) -> Result<()> {
        if let Some(dir) = self.data_dir() {
            fs::create_dir_all(dir)?;
        }
        // Write next to the target and rename so readers never see half a record.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(data)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory store. Clones share the same slot, so a test can keep one
/// handle and give the other to a `SettingsStore`.
#[derive(Debug, Clone, Default)]
pub struct MemoryDataStore {
    data: Rc<RefCell<Option<Value>>>,
    saves: Rc<Cell<usize>>,
}

impl MemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: Value) -> Self {
        let store = Self::new();
        *store.data.borrow_mut() = Some(data);
        store
    }

    pub fn data(&self) -> Option<Value> {
        self.data.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl DataStore for MemoryDataStore {
    fn load_data(&self) -> Result<Option<Value>> {
        Ok(self.data.borrow().clone())
    }

    fn save_data(&mut self, data: &Value) -> Result<()> {
        *self.data.borrow_mut() = Some(data.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path());
        assert!(store.load_data().unwrap().is_none());
    }

    #[test]
    fn test_save_creates_directory_and_roundtrips() {
        let tmp = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(tmp.path());

        store.save_data(&json!({"notesFolder": "inbox"})).unwrap();

        assert!(tmp.path().join(".stickies/data.json").exists());
        assert!(!tmp.path().join(".stickies/data.json.tmp").exists());
        let loaded = store.load_data().unwrap().unwrap();
        assert_eq!(loaded["notesFolder"], "inbox");
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path());
        fs::create_dir_all(tmp.path().join(STICKIES_DIR)).unwrap();
        fs::write(store.path(), "{not json").unwrap();

        assert!(store.load_data().is_err());
    }

    #[test]
    fn test_memory_store_shares_state_between_clones() {
        let handle = MemoryDataStore::new();
        let mut store = handle.clone();

        store.save_data(&json!({"a": 1})).unwrap();

        assert_eq!(handle.save_count(), 1);
        assert_eq!(handle.data().unwrap()["a"], 1);
    }
}
