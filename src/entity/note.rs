// src/entity/note.rs
use serde::{Deserialize, Serialize};

use super::{NoteId, Position};

/// A single sticky note and the file that backs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    /// Last-known content of the backing file.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub position: Position,
    /// Vault-relative path of the backing file. Never changes after creation.
    pub linked_file: String,
}

impl Note {
    pub fn new(linked_file: String, content: String, position: Position) -> Self {
        Self {
            id: NoteId::new(),
            content,
            position,
            linked_file,
        }
    }

    /// Short id used in CLI output.
    pub fn short_id(&self) -> String {
        self.id.short()
    }
}
