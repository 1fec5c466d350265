//! Maps a note to its backing markdown file.

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::entity::Note;
use crate::error::Result;
use crate::vault::{normalize_path, parent_folder, FileHandle, Vault};

/// What `ensure_file` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    Created,
    /// The file was already there and now holds the note's content.
    Overwritten,
}

/// Make sure the note's folder and file exist and the file holds
/// `note.content`. Calling it again for the same note overwrites instead of
/// failing.
pub fn ensure_file<V: Vault>(vault: &mut V, note: &Note) -> Result<(FileHandle, EnsureOutcome)> {
    let path = normalize_path(&note.linked_file);

    if let Some(folder) = parent_folder(&path) {
        if !vault.exists(folder) {
            vault.create_folder(folder)?;
            info!(folder, "Created notes folder");
        }
    }

    match vault.create(&path, &note.content) {
        Ok(file) => {
            info!(path = %path, "Created note file");
            Ok((file, EnsureOutcome::Created))
        }
        Err(create_err) => {
            let file = match vault.get_file_by_path(&path) {
                Ok(file) => file,
                Err(_) => return Err(create_err),
            };
            warn!(path = %path, error = %create_err, "Note file exists, overwriting");
            vault.modify(&file, &note.content)?;
            Ok((file, EnsureOutcome::Overwritten))
        }
    }
}

pub fn read_file<V: Vault>(vault: &V, path: &str) -> Result<String> {
    let file = vault.get_file_by_path(path)?;
    vault.read(&file)
}

pub fn write_file<V: Vault>(vault: &mut V, path: &str, content: &str) -> Result<()> {
    let file = vault.get_file_by_path(path)?;
    vault.modify(&file, content)?;
    debug!(path = file.path(), bytes = content.len(), "Wrote note file");
    Ok(())
}

/// `<folder>/<YYYYMMDDHHMMSS>.md`, with a `-N` suffix when the timestamped
/// name is already bound to another note.
pub fn generate_file_path(
    notes_folder: &str,
    now: NaiveDateTime,
    is_taken: impl Fn(&str) -> bool,
) -> String {
    let folder = normalize_path(notes_folder);
    let stamp = now.format("%Y%m%d%H%M%S").to_string();
    let join = |name: &str| {
        if folder == "/" {
            format!("{}.md", name)
        } else {
            format!("{}/{}.md", folder, name)
        }
    };

    let mut candidate = join(&stamp);
    let mut suffix = 1;
    while is_taken(&candidate) {
        candidate = join(&format!("{}-{}", stamp, suffix));
        suffix += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Position;
    use crate::error::StickyError;
    use crate::vault::MemoryVault;
    use chrono::NaiveDate;

    fn note(path: &str, content: &str) -> Note {
        Note::new(path.to_string(), content.to_string(), Position::default())
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_ensure_creates_folder_and_file() {
        let mut vault = MemoryVault::new();
        let n = note("sticky-notes/a.md", "");

        let (file, outcome) = ensure_file(&mut vault, &n).unwrap();

        assert_eq!(outcome, EnsureOutcome::Created);
        assert_eq!(file.path(), "sticky-notes/a.md");
        assert!(vault.exists("sticky-notes"));
        assert_eq!(vault.file("sticky-notes/a.md"), Some(""));
    }

    #[test]
    fn test_ensure_twice_is_idempotent() {
        let mut vault = MemoryVault::new();
        let mut n = note("sticky-notes/a.md", "first");
        ensure_file(&mut vault, &n).unwrap();

        n.content = "second".to_string();
        let (_, outcome) = ensure_file(&mut vault, &n).unwrap();

        assert_eq!(outcome, EnsureOutcome::Overwritten);
        assert_eq!(vault.file_count(), 1);
        assert_eq!(vault.file("sticky-notes/a.md"), Some("second"));
    }

    #[test]
    fn test_ensure_surfaces_io_failure() {
        let mut vault = MemoryVault::new();
        vault.set_read_only(true);

        let err = ensure_file(&mut vault, &note("sticky-notes/a.md", "")).unwrap_err();
        assert!(matches!(err, StickyError::Io(_)));
    }

    #[test]
    fn test_read_missing_file_is_not_found() {
        let vault = MemoryVault::new();
        assert!(read_file(&vault, "gone.md").unwrap_err().is_not_found());
    }

    #[test]
    fn test_write_then_read_returns_same_content() {
        let mut vault = MemoryVault::new();
        vault.insert_file("a.md", "");

        write_file(&mut vault, "a.md", "hello\nworld").unwrap();

        assert_eq!(read_file(&vault, "a.md").unwrap(), "hello\nworld");
    }

    #[test]
    fn test_write_missing_file_is_not_found() {
        let mut vault = MemoryVault::new();
        assert!(write_file(&mut vault, "gone.md", "x").unwrap_err().is_not_found());
        assert!(vault.writes().is_empty());
    }

    #[test]
    fn test_generate_file_path() {
        let path = generate_file_path("sticky-notes/", at(7, 5, 3), |_| false);
        assert_eq!(path, "sticky-notes/20240309070503.md");
    }

    #[test]
    fn test_generate_file_path_avoids_bound_names() {
        let taken = ["inbox/20240309070503.md", "inbox/20240309070503-1.md"];
        let path = generate_file_path("inbox", at(7, 5, 3), |p| taken.contains(&p));
        assert_eq!(path, "inbox/20240309070503-2.md");
    }

    #[test]
    fn test_generate_file_path_at_vault_root() {
        let path = generate_file_path("/", at(0, 0, 0), |_| false);
        assert_eq!(path, "20240309000000.md");
    }
}
