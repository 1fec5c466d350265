//! Editor subscriptions, keyed by note.
//!
//! A note gets a subscription while its linked file is open in a host
//! editor. Only change events from that exact editor are routed to the note.

use std::collections::HashMap;

use tracing::debug;

use crate::entity::NoteId;
use crate::event::EditorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub editor: EditorId,
    pub handle: SubscriptionHandle,
}

#[derive(Debug, Default)]
pub struct EditorBridge {
    subscriptions: HashMap<NoteId, Subscription>,
    next_handle: u64,
    teardowns: usize,
}

impl EditorBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `note` to `editor`, tearing down whatever was bound before,
    /// both for this note and for this editor.
    pub fn bind(&mut self, note: NoteId, editor: EditorId) -> SubscriptionHandle {
        self.unbind(note);
        self.release_editor(editor);

        let handle = SubscriptionHandle(self.next_handle);
        self.next_handle += 1;
        self.subscriptions.insert(note, Subscription { editor, handle });
        debug!(note = %note, editor = %editor, "Bound editor subscription");
        handle
    }

    /// Tear down the note's subscription. Returns false if it had none.
    pub fn unbind(&mut self, note: NoteId) -> bool {
        match self.subscriptions.remove(&note) {
            Some(sub) => {
                self.teardown(note, sub);
                true
            }
            None => false,
        }
    }

    /// Drop every subscription pointing at `editor`. An editor that now
    /// shows another file must stop feeding the notes it used to show.
    pub fn release_editor(&mut self, editor: EditorId) -> Vec<NoteId> {
        let stale: Vec<NoteId> = self
            .subscriptions
            .iter()
            .filter(|(_, sub)| sub.editor == editor)
            .map(|(note, _)| *note)
            .collect();
        for note in &stale {
            self.unbind(*note);
        }
        stale
    }

    pub fn note_for_editor(&self, editor: EditorId) -> Option<NoteId> {
        self.subscriptions
            .iter()
            .find(|(_, sub)| sub.editor == editor)
            .map(|(note, _)| *note)
    }

    pub fn subscription(&self, note: NoteId) -> Option<Subscription> {
        self.subscriptions.get(&note).copied()
    }

    /// Tear down everything. Returns how many subscriptions were live.
    pub fn teardown_all(&mut self) -> usize {
        let live: Vec<(NoteId, Subscription)> = self.subscriptions.drain().collect();
        let count = live.len();
        for (note, sub) in live {
            self.teardown(note, sub);
        }
        count
    }

    /// Total teardowns performed so far.
    pub fn teardown_count(&self) -> usize {
        self.teardowns
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    fn teardown(&mut self, note: NoteId, sub: Subscription) {
        self.teardowns += 1;
        debug!(note = %note, editor = %sub.editor, "Tore down editor subscription");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_routes_editor_to_note() {
        let mut bridge = EditorBridge::new();
        let note = NoteId::new();

        bridge.bind(note, EditorId(1));

        assert_eq!(bridge.note_for_editor(EditorId(1)), Some(note));
        assert_eq!(bridge.note_for_editor(EditorId(2)), None);
    }

    #[test]
    fn test_rebind_tears_down_previous() {
        let mut bridge = EditorBridge::new();
        let note = NoteId::new();

        let first = bridge.bind(note, EditorId(1));
        let second = bridge.bind(note, EditorId(2));

        assert_ne!(first, second);
        assert_eq!(bridge.teardown_count(), 1);
        assert_eq!(bridge.len(), 1);
        assert_eq!(bridge.note_for_editor(EditorId(1)), None);
        assert_eq!(bridge.subscription(note).unwrap().editor, EditorId(2));
    }

    #[test]
    fn test_binding_editor_to_other_note_releases_first() {
        let mut bridge = EditorBridge::new();
        let a = NoteId::new();
        let b = NoteId::new();

        bridge.bind(a, EditorId(7));
        bridge.bind(b, EditorId(7));

        assert!(bridge.subscription(a).is_none());
        assert_eq!(bridge.note_for_editor(EditorId(7)), Some(b));
    }

    #[test]
    fn test_teardown_all() {
        let mut bridge = EditorBridge::new();
        bridge.bind(NoteId::new(), EditorId(1));
        bridge.bind(NoteId::new(), EditorId(2));

        assert_eq!(bridge.teardown_all(), 2);
        assert!(bridge.is_empty());
        assert_eq!(bridge.teardown_count(), 2);
    }

    #[test]
    fn test_unbind_unknown() {
        let mut bridge = EditorBridge::new();
        assert!(!bridge.unbind(NoteId::new()));
        assert_eq!(bridge.teardown_count(), 0);
    }
}
