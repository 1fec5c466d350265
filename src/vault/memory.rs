use std::collections::{BTreeMap, BTreeSet};
use std::io;

use super::{normalize_path, parent_folder, FileHandle, Vault};
use crate::error::{Result, StickyError};

/// In-memory vault. Records every write so callers can check that a sync
/// step did or did not touch a file.
#[derive(Debug, Default, Clone)]
pub struct MemoryVault {
    files: BTreeMap<String, String>,
    folders: BTreeSet<String>,
    writes: Vec<String>,
    read_only: bool,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a file without counting it as a write.
    pub fn insert_file(&mut self, path: &str, content: &str) {
        let path = normalize_path(path);
        if let Some(parent) = parent_folder(&path) {
            self.folders.insert(parent.to_string());
        }
        self.files.insert(path, content.to_string());
    }

    /// Remove a file as if it were deleted outside the host.
    pub fn remove_file(&mut self, path: &str) -> Option<String> {
        self.files.remove(&normalize_path(path))
    }

    pub fn file(&self, path: &str) -> Option<&str> {
        self.files.get(&normalize_path(path)).map(String::as_str)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Paths written through `create` or `modify`, oldest first.
    pub fn writes(&self) -> &[String] {
        &self.writes
    }

    /// Make every mutating call fail with a permission error.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    fn check_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "vault is read-only").into());
        }
        Ok(())
    }
}

impl Vault for MemoryVault {
    fn exists(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.files.contains_key(&path) || self.folders.contains(&path)
    }

    fn create_folder(&mut self, path: &str) -> Result<()> {
        self.check_writable()?;
        self.folders.insert(normalize_path(path));
        Ok(())
    }

    fn create(&mut self, path: &str, content: &str) -> Result<FileHandle> {
        self.check_writable()?;
        let path = normalize_path(path);
        if self.files.contains_key(&path) {
            return Err(StickyError::AlreadyExists(path));
        }
        self.files.insert(path.clone(), content.to_string());
        self.writes.push(path.clone());
        Ok(FileHandle::new(path))
    }

    fn modify(&mut self, file: &FileHandle, content: &str) -> Result<()> {
        self.check_writable()?;
        match self.files.get_mut(file.path()) {
            Some(existing) => {
                *existing = content.to_string();
                self.writes.push(file.path().to_string());
                Ok(())
            }
            None => Err(StickyError::NotFound(file.path().to_string())),
        }
    }

    fn read(&self, file: &FileHandle) -> Result<String> {
        self.files
            .get(file.path())
            .cloned()
            .ok_or_else(|| StickyError::NotFound(file.path().to_string()))
    }

    fn get_file_by_path(&self, path: &str) -> Result<FileHandle> {
        let path = normalize_path(path);
        if self.files.contains_key(&path) {
            Ok(FileHandle::new(path))
        } else {
            Err(StickyError::NotFound(path))
        }
    }
}
