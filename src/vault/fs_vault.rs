use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{normalize_path, FileHandle, Vault};
use crate::error::{Result, StickyError};

/// A vault rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let normalized = normalize_path(path);
        if normalized == "/" {
            return self.root.clone();
        }
        normalized
            .split('/')
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }

    /// Convert an absolute path reported by the OS into a vault path.
    pub fn relative_path(&self, absolute: &Path) -> Option<String> {
        let relative = absolute.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("/"))
        }
    }
}

impl Vault for FsVault {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).exists()
    }

    fn create_folder(&mut self, path: &str) -> Result<()> {
        fs::create_dir_all(self.resolve(path))?;
        Ok(())
    }

    fn create(&mut self, path: &str, content: &str) -> Result<FileHandle> {
        let full = self.resolve(path);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&full) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StickyError::AlreadyExists(normalize_path(path)));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(content.as_bytes())?;
        debug!(path = %full.display(), bytes = content.len(), "Created file");
        Ok(FileHandle::new(path))
    }

    fn modify(&mut self, file: &FileHandle, content: &str) -> Result<()> {
        let full = self.resolve(file.path());
        if !full.is_file() {
            return Err(StickyError::NotFound(file.path().to_string()));
        }
        fs::write(&full, content)?;
        debug!(path = %full.display(), bytes = content.len(), "Modified file");
        Ok(())
    }

    fn read(&self, file: &FileHandle) -> Result<String> {
        match fs::read_to_string(self.resolve(file.path())) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StickyError::NotFound(file.path().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn get_file_by_path(&self, path: &str) -> Result<FileHandle> {
        if self.resolve(path).is_file() {
            Ok(FileHandle::new(path))
        } else {
            Err(StickyError::NotFound(normalize_path(path)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_then_read() {
        let tmp = TempDir::new().unwrap();
        let mut vault = FsVault::new(tmp.path());

        vault.create_folder("notes").unwrap();
        let file = vault.create("notes/a.md", "hello").unwrap();

        assert_eq!(file.path(), "notes/a.md");
        assert_eq!(vault.read(&file).unwrap(), "hello");
        assert!(vault.exists("notes"));
        assert!(tmp.path().join("notes").join("a.md").is_file());
    }

    #[test]
    fn test_create_existing_fails() {
        let tmp = TempDir::new().unwrap();
        let mut vault = FsVault::new(tmp.path());

        vault.create("a.md", "one").unwrap();
        let err = vault.create("a.md", "two").unwrap_err();

        assert!(matches!(err, StickyError::AlreadyExists(ref p) if p == "a.md"));
        assert_eq!(fs::read_to_string(tmp.path().join("a.md")).unwrap(), "one");
    }

    #[test]
    fn test_get_file_by_path_missing() {
        let tmp = TempDir::new().unwrap();
        let vault = FsVault::new(tmp.path());

        let err = vault.get_file_by_path("nope.md").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_folder_is_not_a_file() {
        let tmp = TempDir::new().unwrap();
        let mut vault = FsVault::new(tmp.path());
        vault.create_folder("notes").unwrap();

        assert!(vault.get_file_by_path("notes").is_err());
    }

    #[test]
    fn test_modify_deleted_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let mut vault = FsVault::new(tmp.path());
        let file = vault.create("a.md", "x").unwrap();
        fs::remove_file(tmp.path().join("a.md")).unwrap();

        assert!(vault.modify(&file, "y").unwrap_err().is_not_found());
        assert!(vault.read(&file).unwrap_err().is_not_found());
    }

    #[test]
    fn test_relative_path() {
        let tmp = TempDir::new().unwrap();
        let vault = FsVault::new(tmp.path());

        let abs = tmp.path().join("notes").join("a.md");
        assert_eq!(vault.relative_path(&abs).as_deref(), Some("notes/a.md"));
        assert_eq!(vault.relative_path(tmp.path()), None);
    }
}
