//! Exclusive input capture for mounted widgets.
//!
//! At most one widget owns the keyboard at a time. While a widget owns it,
//! the host must not run its own shortcut handling for any keystroke.

use crate::entity::NoteId;

/// Where focus went when a widget's text surface lost it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlurTarget {
    /// The widget's own delete button.
    DeleteControl,
    /// Another sticky widget's text surface.
    OtherWidget(NoteId),
    /// Anything else in the host window.
    Elsewhere,
}

#[derive(Debug, Default)]
pub struct FocusArbiter {
    owner: Option<NoteId>,
}

impl FocusArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(&self) -> Option<NoteId> {
        self.owner
    }

    /// Hand capture to `id`, returning the previous owner if it changed.
    pub fn grant(&mut self, id: NoteId) -> Option<NoteId> {
        match self.owner.replace(id) {
            Some(prev) if prev != id => Some(prev),
            _ => None,
        }
    }

    /// Decide whether `id` keeps capture after losing focus to `target`.
    pub fn on_blur(&mut self, id: NoteId, target: BlurTarget) -> bool {
        if self.owner != Some(id) {
            return false;
        }
        match target {
            BlurTarget::DeleteControl => {
                self.owner = None;
                false
            }
            BlurTarget::OtherWidget(other) => {
                self.owner = Some(other);
                false
            }
            BlurTarget::Elsewhere => true,
        }
    }

    pub fn release(&mut self, id: NoteId) {
        if self.owner == Some(id) {
            self.owner = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blur_elsewhere_keeps_capture() {
        let mut arbiter = FocusArbiter::new();
        let a = NoteId::new();
        arbiter.grant(a);

        assert!(arbiter.on_blur(a, BlurTarget::Elsewhere));
        assert_eq!(arbiter.owner(), Some(a));
    }

    #[test]
    fn test_blur_to_delete_control_releases() {
        let mut arbiter = FocusArbiter::new();
        let a = NoteId::new();
        arbiter.grant(a);

        assert!(!arbiter.on_blur(a, BlurTarget::DeleteControl));
        assert_eq!(arbiter.owner(), None);
    }

    #[test]
    fn test_blur_to_other_widget_hands_over() {
        let mut arbiter = FocusArbiter::new();
        let a = NoteId::new();
        let b = NoteId::new();
        arbiter.grant(a);

        assert!(!arbiter.on_blur(a, BlurTarget::OtherWidget(b)));
        assert_eq!(arbiter.owner(), Some(b));
    }

    #[test]
    fn test_grant_reports_previous_owner() {
        let mut arbiter = FocusArbiter::new();
        let a = NoteId::new();
        let b = NoteId::new();

        assert_eq!(arbiter.grant(a), None);
        assert_eq!(arbiter.grant(a), None);
        assert_eq!(arbiter.grant(b), Some(a));
    }
}
