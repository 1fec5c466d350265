use thiserror::Error;

#[derive(Error, Debug)]
pub enum StickyError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("File is already bound to a sticky note: {0}")]
    DuplicateBinding(String),

    #[error("Sticky note not found: {0}")]
    NoteNotFound(String),

    #[error("Ambiguous note id '{0}'. Use more characters.")]
    AmbiguousId(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}

impl StickyError {
    /// True for failures caused by a path that no longer resolves to a file.
    pub fn is_not_found(&self) -> bool {
        match self {
            StickyError::NotFound(_) => true,
            StickyError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, StickyError>;
