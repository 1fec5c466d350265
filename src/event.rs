//! Host events the coordinator reacts to.

use crate::vault::FileHandle;

/// Identity of one host editor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditorId(pub u64);

impl std::fmt::Display for EditorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "editor#{}", self.0)
    }
}

/// The view that just became active in the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveView {
    pub editor: EditorId,
    /// File shown by a markdown editor; `None` for any other kind of view.
    pub file: Option<FileHandle>,
}

impl ActiveView {
    pub fn markdown(editor: EditorId, path: &str) -> Self {
        Self {
            editor,
            file: Some(FileHandle::new(path)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEvent {
    ActiveViewChanged(Option<ActiveView>),
    /// An editor's buffer changed; `content` is its full current value.
    EditorChanged { editor: EditorId, content: String },
    FileModified(FileHandle),
}

/// Where a piece of content came from. Decides which sinks it flows to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    /// Typed into the widget.
    Local,
    /// Typed into a host editor showing the linked file.
    Editor,
    /// Read back from the file after a modify notification.
    File,
}

impl std::fmt::Display for ContentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentSource::Local => write!(f, "local"),
            ContentSource::Editor => write!(f, "editor"),
            ContentSource::File => write!(f, "file"),
        }
    }
}
