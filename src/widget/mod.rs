//! The floating sticky note surface.
//!
//! A `Widget` never touches storage. Every input returns an optional
//! [`WidgetRequest`] that the coordinator carries out, so the widget only
//! owns its text, drag and focus state.

mod focus;
mod text;

pub use focus::{BlurTarget, FocusArbiter};
pub use text::TextBuffer;

use serde::Serialize;

use crate::entity::{Note, NoteId, Position};

/// A keystroke delivered to the widget's text surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    /// Any other key. Still swallowed so host shortcuts never fire.
    Other(String),
}

/// Raw UI events for one widget.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetInput {
    Key(Key),
    /// The surface's value was replaced wholesale (paste, IME commit).
    Input(String),
    Select { anchor: usize, head: usize },
    PointerDownHeader { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    Focus,
    Blur(BlurTarget),
    DeleteClicked,
}

/// Work the widget needs done by its owner.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetRequest {
    /// Local edit: cache the content, save settings, write the file.
    PersistContent(String),
    /// Drag in progress: keep the note's position current in memory.
    StagePosition(Position),
    /// Drag finished: store the final position and save.
    SavePosition(Position),
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    /// Pointer offset from the widget's top-left corner.
    Dragging { offset_x: f64, offset_y: f64 },
}

/// What a UI layer needs to draw one widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetFrame {
    pub id: NoteId,
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub focused: bool,
    pub dragging: bool,
}

#[derive(Debug)]
pub struct Widget {
    id: NoteId,
    position: Position,
    buffer: TextBuffer,
    drag: DragState,
    focused: bool,
    mounted: bool,
}

impl Widget {
    /// Mount a widget for `note` at `position`, focused.
    pub fn mount(note: &Note, position: Position) -> Self {
        Self {
            id: note.id,
            position,
            buffer: TextBuffer::new(&note.content),
            drag: DragState::Idle,
            focused: true,
            mounted: true,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn text(&self) -> &str {
        self.buffer.value()
    }

    pub fn has_focus(&self) -> bool {
        self.focused
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn frame(&self) -> WidgetFrame {
        WidgetFrame {
            id: self.id,
            x: self.position.x,
            y: self.position.y,
            text: self.buffer.value().to_string(),
            focused: self.focused,
            dragging: matches!(self.drag, DragState::Dragging { .. }),
        }
    }

    /// Show `content`. With `should_persist` the change is a local edit and
    /// must be written out; without it the content came from the file or
    /// the editor and must not be written back.
    pub fn update_content(&mut self, content: &str, should_persist: bool) -> Option<WidgetRequest> {
        if self.buffer.value() != content {
            self.buffer.set_value(content);
        }
        should_persist.then(|| WidgetRequest::PersistContent(content.to_string()))
    }

    pub fn handle(&mut self, input: WidgetInput) -> Option<WidgetRequest> {
        if !self.mounted {
            return None;
        }
        match input {
            WidgetInput::Key(key) => self.key_down(key),
            WidgetInput::Input(value) => self.update_content(&value, true),
            WidgetInput::Select { anchor, head } => {
                self.buffer.select(anchor, head);
                None
            }
            WidgetInput::PointerDownHeader { x, y } => {
                self.drag = DragState::Dragging {
                    offset_x: x - self.position.x,
                    offset_y: y - self.position.y,
                };
                None
            }
            WidgetInput::PointerMove { x, y } => self.drag_to(x, y),
            WidgetInput::PointerUp => match self.drag {
                DragState::Dragging { .. } => {
                    self.drag = DragState::Idle;
                    Some(WidgetRequest::SavePosition(self.position))
                }
                DragState::Idle => None,
            },
            WidgetInput::Focus => {
                self.focused = true;
                None
            }
            // Focus arbitration is decided by the owner; see `set_focused`.
            WidgetInput::Blur(_) => None,
            WidgetInput::DeleteClicked => {
                self.unmount();
                Some(WidgetRequest::Delete)
            }
        }
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused && self.mounted;
    }

    /// Remove the widget from the screen. The note record is untouched.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.focused = false;
        self.drag = DragState::Idle;
    }

    fn key_down(&mut self, key: Key) -> Option<WidgetRequest> {
        match key {
            Key::Char(c) => {
                let mut utf8 = [0u8; 4];
                self.buffer.insert_str(c.encode_utf8(&mut utf8));
            }
            Key::Enter => self.buffer.insert_str("\n"),
            Key::Backspace => {
                if !self.buffer.backspace() {
                    return None;
                }
            }
            Key::Other(_) => return None,
        }
        let value = self.buffer.value().to_string();
        self.update_content(&value, true)
    }

    fn drag_to(&mut self, x: f64, y: f64) -> Option<WidgetRequest> {
        let DragState::Dragging { offset_x, offset_y } = self.drag else {
            return None;
        };
        self.position = Position::new(x - offset_x, y - offset_y);
        Some(WidgetRequest::StagePosition(self.position))
    }
}
