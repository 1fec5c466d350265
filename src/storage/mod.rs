mod data_store;
mod settings_store;

pub use data_store::{DataStore, JsonFileStore, MemoryDataStore, DATA_FILE, STICKIES_DIR};
pub use settings_store::{Settings, SettingsStore, DEFAULT_NOTES_FOLDER, DEFAULT_NOTE_COLOR};
