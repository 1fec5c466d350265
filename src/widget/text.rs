//! The widget's live text with a caret and an optional selection.
//!
//! Offsets are byte offsets into the text and always sit on char
//! boundaries. The selection runs between `anchor` and `head`; when they are
//! equal there is only a caret.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    anchor: usize,
    head: usize,
}

impl TextBuffer {
    /// Create a buffer with the caret after the last character.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            anchor: text.len(),
            head: text.len(),
        }
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.head
    }

    /// Selected range, ordered.
    pub fn selection(&self) -> (usize, usize) {
        (self.anchor.min(self.head), self.anchor.max(self.head))
    }

    pub fn has_selection(&self) -> bool {
        self.anchor != self.head
    }

    pub fn select(&mut self, anchor: usize, head: usize) {
        self.anchor = self.floor_boundary(anchor);
        self.head = self.floor_boundary(head);
    }

    /// Replace the whole text. The selection is kept where it still fits.
    pub fn set_value(&mut self, text: &str) {
        self.text = text.to_string();
        self.anchor = self.floor_boundary(self.anchor);
        self.head = self.floor_boundary(self.head);
    }

    /// Insert at the caret, replacing any selection.
    pub fn insert_str(&mut self, s: &str) {
        let (start, end) = self.selection();
        self.text.replace_range(start..end, s);
        self.anchor = start + s.len();
        self.head = self.anchor;
    }

    /// Delete the selection, or the char before the caret.
    pub fn backspace(&mut self) -> bool {
        let (start, end) = self.selection();
        if start != end {
            self.text.replace_range(start..end, "");
            self.anchor = start;
            self.head = start;
            return true;
        }
        let Some(prev) = self.text[..start].chars().next_back() else {
            return false;
        };
        let from = start - prev.len_utf8();
        self.text.replace_range(from..start, "");
        self.anchor = from;
        self.head = from;
        true
    }

    fn floor_boundary(&self, offset: usize) -> usize {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_puts_caret_at_end() {
        let buf = TextBuffer::new("abc");
        assert_eq!(buf.cursor(), 3);
        assert!(!buf.has_selection());
    }

    #[test]
    fn test_insert_replaces_selection() {
        let mut buf = TextBuffer::new("hello world");
        buf.select(6, 11);
        buf.insert_str("there");
        assert_eq!(buf.value(), "hello there");
        assert_eq!(buf.cursor(), 11);
    }

    #[test]
    fn test_insert_newline_mid_text() {
        let mut buf = TextBuffer::new("ab");
        buf.select(1, 1);
        buf.insert_str("\n");
        assert_eq!(buf.value(), "a\nb");
        assert_eq!(buf.cursor(), 2);
    }

    #[test]
    fn test_backspace_multibyte() {
        let mut buf = TextBuffer::new("añ");
        assert!(buf.backspace());
        assert_eq!(buf.value(), "a");
        assert!(buf.backspace());
        assert!(!buf.backspace());
        assert_eq!(buf.value(), "");
    }

    #[test]
    fn test_backspace_deletes_selection() {
        let mut buf = TextBuffer::new("abcdef");
        buf.select(4, 1);
        assert!(buf.backspace());
        assert_eq!(buf.value(), "aef");
        assert_eq!(buf.cursor(), 1);
    }

    #[test]
    fn test_set_value_clamps_selection() {
        let mut buf = TextBuffer::new("a long line");
        buf.set_value("ñ");
        // Offset 11 clamps to 2, the end of the two-byte char.
        assert_eq!(buf.cursor(), 2);

        buf.select(1, 1);
        assert_eq!(buf.cursor(), 0);
    }
}
