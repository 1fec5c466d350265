use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::DataStore;
use crate::entity::{Note, NoteId, Position};
use crate::error::{Result, StickyError};
use crate::vault::normalize_path;

pub const DEFAULT_NOTE_COLOR: &str = "#ffffa5";
pub const DEFAULT_NOTES_FOLDER: &str = "sticky-notes";

/// The persisted record: every note plus the global defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub notes: Vec<Note>,
    pub default_note_color: String,
    pub notes_folder: String,
    /// Keys written by someone else. Carried through every save untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notes: Vec::new(),
            default_note_color: DEFAULT_NOTE_COLOR.to_string(),
            notes_folder: DEFAULT_NOTES_FOLDER.to_string(),
            extra: Map::new(),
        }
    }
}

impl Settings {
    /// Lay persisted keys over the defaults. Keys missing from the persisted
    /// object keep their default value; every persisted key is kept.
    pub fn merged_over_defaults(persisted: Option<Value>) -> Result<Self> {
        let mut merged = serde_json::to_value(Settings::default())?;

        if let (Some(Value::Object(saved)), Value::Object(base)) = (persisted, &mut merged) {
            base.extend(saved);
        }

        Ok(serde_json::from_value(merged)?)
    }
}

/// Owns the settings record. Every mutating method saves before it returns.
pub struct SettingsStore<D: DataStore> {
    settings: Settings,
    store: D,
}

impl<D: DataStore> SettingsStore<D> {
    pub fn load(store: D) -> Result<Self> {
        let settings = Settings::merged_over_defaults(store.load_data()?)?;
        debug!(notes = settings.notes.len(), "Loaded settings");
        Ok(Self { settings, store })
    }

    /// Replace the in-memory record with what the data store holds now.
    /// Another process may have saved since this one loaded.
    pub fn reload(&mut self) -> Result<()> {
        self.settings = Settings::merged_over_defaults(self.store.load_data()?)?;
        debug!(notes = self.settings.notes.len(), "Reloaded settings");
        Ok(())
    }

    pub fn save(&mut self) -> Result<()> {
        let data = serde_json::to_value(&self.settings)?;
        self.store.save_data(&data)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &D {
        &self.store
    }

    pub fn notes(&self) -> &[Note] {
        &self.settings.notes
    }

    pub fn find(&self, id: NoteId) -> Option<&Note> {
        self.settings.notes.iter().find(|n| n.id == id)
    }

    pub fn find_by_linked_file(&self, path: &str) -> Option<&Note> {
        let path = normalize_path(path);
        self.settings.notes.iter().find(|n| n.linked_file == path)
    }

    pub fn contains_linked_file(&self, path: &str) -> bool {
        self.find_by_linked_file(path).is_some()
    }

    /// Resolve a full id or a unique prefix of one.
    pub fn resolve_id(&self, prefix: &str) -> Result<NoteId> {
        let mut matches = self
            .settings
            .notes
            .iter()
            .filter(|n| n.id.to_string().starts_with(prefix));

        match (matches.next(), matches.next()) {
            (Some(note), None) => Ok(note.id),
            (Some(_), Some(_)) => Err(StickyError::AmbiguousId(prefix.to_string())),
            (None, _) => Err(StickyError::NoteNotFound(prefix.to_string())),
        }
    }

    /// Normalized notes folder, falling back to the default when blank.
    pub fn notes_folder(&self) -> String {
        let folder = normalize_path(&self.settings.notes_folder);
        if folder == "/" {
            DEFAULT_NOTES_FOLDER.to_string()
        } else {
            folder
        }
    }

    pub fn default_note_color(&self) -> &str {
        &self.settings.default_note_color
    }

    pub fn insert(&mut self, mut note: Note) -> Result<()> {
        note.linked_file = normalize_path(&note.linked_file);
        if self.contains_linked_file(&note.linked_file) {
            return Err(StickyError::DuplicateBinding(note.linked_file));
        }
        self.settings.notes.push(note);
        self.save()
    }

    pub fn remove(&mut self, id: NoteId) -> Result<Option<Note>> {
        match self.settings.notes.iter().position(|n| n.id == id) {
            Some(index) => {
                let note = self.settings.notes.remove(index);
                self.save()?;
                Ok(Some(note))
            }
            None => Ok(None),
        }
    }

    /// Replace the cached content. Returns false if the note is gone.
    pub fn set_content(&mut self, id: NoteId, content: &str) -> Result<bool> {
        match self.settings.notes.iter_mut().find(|n| n.id == id) {
            Some(note) => {
                note.content = content.to_string();
                self.save()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Track a position while a drag is in progress. Not persisted until
    /// [`SettingsStore::set_position`] or another save.
    pub fn stage_position(&mut self, id: NoteId, position: Position) -> bool {
        match self.settings.notes.iter_mut().find(|n| n.id == id) {
            Some(note) => {
                note.position = position;
                true
            }
            None => false,
        }
    }

    pub fn set_position(&mut self, id: NoteId, position: Position) -> Result<bool> {
        if !self.stage_position(id, position) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    pub fn set_notes_folder(&mut self, folder: &str) -> Result<()> {
        self.settings.notes_folder = folder.to_string();
        self.save()
    }

    pub fn set_default_note_color(&mut self, color: &str) -> Result<()> {
        self.settings.default_note_color = color.to_string();
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryDataStore;
    use serde_json::json;

    fn note(path: &str) -> Note {
        Note::new(path.to_string(), String::new(), Position::default())
    }

    #[test]
    fn test_load_empty_uses_defaults() {
        let store = SettingsStore::load(MemoryDataStore::new()).unwrap();
        assert_eq!(store.settings(), &Settings::default());
        assert_eq!(store.notes_folder(), "sticky-notes");
        assert_eq!(store.default_note_color(), "#ffffa5");
    }

    #[test]
    fn test_load_merges_over_defaults() {
        let data = MemoryDataStore::with_data(json!({"notesFolder": "inbox/stickies"}));
        let store = SettingsStore::load(data).unwrap();

        assert_eq!(store.notes_folder(), "inbox/stickies");
        assert_eq!(store.default_note_color(), DEFAULT_NOTE_COLOR);
        assert!(store.notes().is_empty());
    }

    #[test]
    fn test_unknown_keys_survive_save() {
        let handle = MemoryDataStore::with_data(json!({
            "notesFolder": "x",
            "hostFlag": 7
        }));
        let mut store = SettingsStore::load(handle.clone()).unwrap();

        store.set_default_note_color("#ccffcc").unwrap();

        let saved = handle.data().unwrap();
        assert_eq!(saved["hostFlag"], 7);
        assert_eq!(saved["notesFolder"], "x");
        let reloaded = SettingsStore::load(handle).unwrap();
        assert_eq!(reloaded.settings().extra["hostFlag"], 7);
    }

    #[test]
    fn test_reload_picks_up_changes_from_another_store() {
        let handle = MemoryDataStore::new();
        let mut first = SettingsStore::load(handle.clone()).unwrap();
        let mut second = SettingsStore::load(handle).unwrap();
        second.insert(note("b.md")).unwrap();

        assert!(first.notes().is_empty());
        first.reload().unwrap();

        assert!(first.contains_linked_file("b.md"));
    }

    #[test]
    fn test_blank_notes_folder_falls_back() {
        let data = MemoryDataStore::with_data(json!({"notesFolder": "  /"}));
        let store = SettingsStore::load(data).unwrap();
        // Whitespace is a legal folder name, only slashes are stripped.
        assert_eq!(store.notes_folder(), "  ");

        let data = MemoryDataStore::with_data(json!({"notesFolder": ""}));
        let store = SettingsStore::load(data).unwrap();
        assert_eq!(store.notes_folder(), DEFAULT_NOTES_FOLDER);
    }

    #[test]
    fn test_insert_persists_immediately() {
        let handle = MemoryDataStore::new();
        let mut store = SettingsStore::load(handle.clone()).unwrap();

        store.insert(note("sticky-notes/a.md")).unwrap();

        assert_eq!(handle.save_count(), 1);
        let saved = handle.data().unwrap();
        assert_eq!(saved["notes"][0]["linkedFile"], "sticky-notes/a.md");
    }

    #[test]
    fn test_insert_rejects_duplicate_binding() {
        let mut store = SettingsStore::load(MemoryDataStore::new()).unwrap();
        store.insert(note("sticky-notes/a.md")).unwrap();

        let err = store.insert(note("/sticky-notes//a.md")).unwrap_err();

        assert!(matches!(err, StickyError::DuplicateBinding(_)));
        assert_eq!(store.notes().len(), 1);
    }

    #[test]
    fn test_remove_persists_and_survives_reload() {
        let handle = MemoryDataStore::new();
        let mut store = SettingsStore::load(handle.clone()).unwrap();
        let a = note("a.md");
        let id = a.id;
        store.insert(a).unwrap();
        store.insert(note("b.md")).unwrap();

        let removed = store.remove(id).unwrap();
        assert_eq!(removed.map(|n| n.id), Some(id));

        let reloaded = SettingsStore::load(handle).unwrap();
        assert!(reloaded.find(id).is_none());
        assert_eq!(reloaded.notes().len(), 1);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let handle = MemoryDataStore::new();
        let mut store = SettingsStore::load(handle.clone()).unwrap();

        assert!(store.remove(NoteId::new()).unwrap().is_none());
        assert_eq!(handle.save_count(), 0);
    }

    #[test]
    fn test_stage_position_does_not_save() {
        let handle = MemoryDataStore::new();
        let mut store = SettingsStore::load(handle.clone()).unwrap();
        let n = note("a.md");
        let id = n.id;
        store.insert(n).unwrap();

        assert!(store.stage_position(id, Position::new(5.0, 6.0)));
        assert_eq!(handle.save_count(), 1);

        store.set_position(id, Position::new(7.0, 8.0)).unwrap();
        assert_eq!(handle.save_count(), 2);
        assert_eq!(handle.data().unwrap()["notes"][0]["position"]["x"], 7.0);
    }

    #[test]
    fn test_resolve_id_by_prefix() {
        let mut store = SettingsStore::load(MemoryDataStore::new()).unwrap();
        let n = note("a.md");
        let id = n.id;
        store.insert(n).unwrap();

        assert_eq!(store.resolve_id(&id.to_string()[..6]).unwrap(), id);
        assert!(matches!(
            store.resolve_id("zzzz"),
            Err(StickyError::NoteNotFound(_))
        ));
        // An empty prefix matches everything.
        store.insert(note("b.md")).unwrap();
        assert!(matches!(store.resolve_id(""), Err(StickyError::AmbiguousId(_))));
    }

    #[test]
    fn test_settings_panel_fields_persist() {
        let handle = MemoryDataStore::new();
        let mut store = SettingsStore::load(handle.clone()).unwrap();

        store.set_notes_folder("daily/stickies").unwrap();
        store.set_default_note_color("#ccffcc").unwrap();

        let reloaded = SettingsStore::load(handle).unwrap();
        assert_eq!(reloaded.notes_folder(), "daily/stickies");
        assert_eq!(reloaded.default_note_color(), "#ccffcc");
    }
}
