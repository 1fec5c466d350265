mod note;

pub use note::Note;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identity of a sticky note, used as the join key between the
/// settings record, the live widgets and the editor subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(Uuid);

impl NoteId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NoteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Screen coordinates of a widget's top-left corner, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of the visible host window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Default widget size; new notes are centred using it.
pub const WIDGET_WIDTH: f64 = 200.0;
pub const WIDGET_HEIGHT: f64 = 150.0;

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Where a freshly created widget is placed.
    pub fn center_slot(&self) -> Position {
        Position {
            x: self.width / 2.0 - WIDGET_WIDTH / 2.0,
            y: self.height / 2.0 - WIDGET_HEIGHT / 2.0,
        }
    }

    /// Pull a restored position back inside the window so the widget
    /// header stays reachable.
    pub fn clamp(&self, position: Position) -> Position {
        let max_x = (self.width - WIDGET_WIDTH).max(0.0);
        let max_y = (self.height - WIDGET_HEIGHT).max(0.0);
        Position {
            x: position.x.clamp(0.0, max_x),
            y: position.y.clamp(0.0, max_y),
        }
    }
}
