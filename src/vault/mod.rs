//! Storage seam for the notes vault.
//!
//! Paths handed to a [`Vault`] are vault-relative and slash-separated; run
//! them through [`normalize_path`] before use.

mod fs_vault;
mod memory;

pub use fs_vault::FsVault;
pub use memory::MemoryVault;

use crate::error::Result;

/// A resolved file inside the vault.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileHandle {
    path: String,
}

impl FileHandle {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: normalize_path(&path.into()),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn extension(&self) -> Option<&str> {
        let name = self.path.rsplit('/').next()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() {
            None
        } else {
            Some(ext)
        }
    }

    pub fn is_markdown(&self) -> bool {
        self.extension() == Some("md")
    }
}

/// File operations the sticky notes need from the host.
pub trait Vault {
    fn exists(&self, path: &str) -> bool;

    fn create_folder(&mut self, path: &str) -> Result<()>;

    /// Create a new file. Fails with `AlreadyExists` if the path is taken.
    fn create(&mut self, path: &str, content: &str) -> Result<FileHandle>;

    fn modify(&mut self, file: &FileHandle, content: &str) -> Result<()>;

    fn read(&self, file: &FileHandle) -> Result<String>;

    /// Resolve a path to a file. Fails with `NotFound` when nothing is there.
    fn get_file_by_path(&self, path: &str) -> Result<FileHandle>;
}

/// Normalize a vault path: forward slashes only, no empty or `.` segments,
/// no leading or trailing slash. The vault root is `/`.
pub fn normalize_path(path: &str) -> String {
    let replaced = path.replace('\\', "/");
    let segments: Vec<&str> = replaced
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    if segments.is_empty() {
        "/".to_string()
    } else {
        segments.join("/")
    }
}

/// Parent folder of a normalized path, if it is not at the vault root.
pub fn parent_folder(path: &str) -> Option<&str> {
    path.rsplit_once('/').map(|(parent, _)| parent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("sticky-notes"), "sticky-notes");
        assert_eq!(normalize_path("/sticky-notes/"), "sticky-notes");
        assert_eq!(normalize_path("a//b\\c.md"), "a/b/c.md");
        assert_eq!(normalize_path("./a/./b.md"), "a/b.md");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("//"), "/");
    }

    #[test]
    fn test_parent_folder() {
        assert_eq!(parent_folder("a/b/c.md"), Some("a/b"));
        assert_eq!(parent_folder("c.md"), None);
    }

    #[test]
    fn test_file_handle_extension() {
        assert_eq!(FileHandle::new("notes/a.md").extension(), Some("md"));
        assert!(FileHandle::new("notes/a.md").is_markdown());
        assert!(!FileHandle::new("notes/a.txt").is_markdown());
        assert_eq!(FileHandle::new("notes/.hidden").extension(), None);
        assert_eq!(FileHandle::new("notes\\x.md").path(), "notes/x.md");
    }
}
