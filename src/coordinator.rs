//! Owns the settings record, the live widgets and the editor subscriptions,
//! and routes content between the widget, the backing file and any host
//! editor showing that file.
//!
//! Content is tagged with a [`ContentSource`] as it enters. Only
//! `ContentSource::Local` content is ever written to the backing file;
//! content that came from the file or an editor only updates the widget and
//! the cached copy, which is what keeps a write from echoing back forever.

use std::collections::HashMap;

use chrono::Local;
use tracing::{debug, error, info, warn};

use crate::binding::{self, EnsureOutcome};
use crate::bridge::EditorBridge;
use crate::entity::{Note, NoteId, Viewport};
use crate::error::{Result, StickyError};
use crate::event::{ActiveView, ContentSource, EditorId, WorkspaceEvent};
use crate::storage::{DataStore, SettingsStore};
use crate::vault::{normalize_path, FileHandle, Vault};
use crate::widget::{BlurTarget, FocusArbiter, Widget, WidgetFrame, WidgetInput, WidgetRequest};

pub struct Coordinator<V: Vault, D: DataStore> {
    vault: V,
    settings: SettingsStore<D>,
    widgets: HashMap<NoteId, Widget>,
    bridge: EditorBridge,
    focus: FocusArbiter,
    viewport: Viewport,
    active_view: Option<ActiveView>,
    notices: Vec<String>,
}

impl<V: Vault, D: DataStore> Coordinator<V, D> {
    /// Load settings and restore a widget for every saved note.
    pub fn start(vault: V, store: D, viewport: Viewport) -> Result<Self> {
        let settings = SettingsStore::load(store)?;
        let mut coordinator = Self {
            vault,
            settings,
            widgets: HashMap::new(),
            bridge: EditorBridge::new(),
            focus: FocusArbiter::new(),
            viewport,
            active_view: None,
            notices: Vec::new(),
        };

        coordinator.refresh_from_files()?;

        let ids: Vec<NoteId> = coordinator.settings.notes().iter().map(|n| n.id).collect();
        for id in &ids {
            coordinator.mount_widget(*id);
        }
        info!(notes = ids.len(), "Sticky notes started");
        Ok(coordinator)
    }

    /// Unmount every widget and tear down editor subscriptions. Settings are
    /// already saved after each change, so nothing is written here.
    pub fn shutdown(&mut self) {
        for widget in self.widgets.values_mut() {
            widget.unmount();
        }
        self.widgets.clear();
        let torn_down = self.bridge.teardown_all();
        info!(subscriptions = torn_down, "Sticky notes shut down");
    }

    /// Pick up settings saved by another process and bring the widgets in
    /// line: notes deleted elsewhere are unmounted, notes created elsewhere
    /// are mounted.
    pub fn reload_settings(&mut self) -> Result<()> {
        self.settings.reload()?;

        let gone: Vec<NoteId> = self
            .widgets
            .keys()
            .filter(|id| self.settings.find(**id).is_none())
            .copied()
            .collect();
        for id in gone {
            if let Some(mut widget) = self.widgets.remove(&id) {
                widget.unmount();
            }
            self.focus.release(id);
            self.bridge.unbind(id);
            debug!(note = %id, "Note removed elsewhere");
        }

        let added: Vec<NoteId> = self
            .settings
            .notes()
            .iter()
            .map(|n| n.id)
            .filter(|id| !self.widgets.contains_key(id))
            .collect();
        for id in added {
            self.mount_widget(id);
            debug!(note = %id, "Note added elsewhere");
        }
        Ok(())
    }

    // -- Accessors ----------------------------------------------------------

    pub fn vault(&self) -> &V {
        &self.vault
    }

    pub fn vault_mut(&mut self) -> &mut V {
        &mut self.vault
    }

    pub fn settings(&self) -> &SettingsStore<D> {
        &self.settings
    }

    pub fn bridge(&self) -> &EditorBridge {
        &self.bridge
    }

    pub fn widget(&self, id: NoteId) -> Option<&Widget> {
        self.widgets.get(&id)
    }

    /// Note whose widget currently owns the keyboard. While this is `Some`,
    /// the host must not handle keystrokes itself.
    pub fn keyboard_owner(&self) -> Option<NoteId> {
        self.focus.owner()
    }

    /// Frames for every live widget, in note creation order.
    pub fn frames(&self) -> Vec<WidgetFrame> {
        self.settings
            .notes()
            .iter()
            .filter_map(|n| self.widgets.get(&n.id))
            .map(Widget::frame)
            .collect()
    }

    /// Drain the user-facing messages produced since the last call.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    // -- Note lifecycle -----------------------------------------------------

    /// Create an empty note backed by a new timestamped file in the notes
    /// folder, centred in the viewport.
    pub fn create_new_note(&mut self) -> Result<NoteId> {
        let folder = self.settings.notes_folder();
        let path = binding::generate_file_path(&folder, Local::now().naive_local(), |p| {
            self.settings.contains_linked_file(p)
        });
        let note = Note::new(path, String::new(), self.viewport.center_slot());

        match self.create_note(note) {
            Ok(id) => Ok(id),
            Err(e) => {
                error!(error = %e, "Failed to create new note");
                self.notices.push(format!("Failed to create new note: {}", e));
                Err(e)
            }
        }
    }

    /// Create a note bound to an existing vault file. If the file is already
    /// bound, the existing note's widget is restored instead.
    pub fn create_from_file(&mut self, path: &str) -> Result<NoteId> {
        let path = normalize_path(path);

        if let Some(id) = self.settings.find_by_linked_file(&path).map(|n| n.id) {
            self.restore_widget(id);
            self.notices.push("Restored existing sticky note".to_string());
            return Ok(id);
        }

        let file = self.vault.get_file_by_path(&path)?;
        if !file.is_markdown() {
            return Err(StickyError::Storage(format!("Not a markdown file: {}", path)));
        }
        let content = self.vault.read(&file)?;
        let note = Note::new(path, content, self.viewport.center_slot());
        let id = note.id;

        self.settings.insert(note)?;
        self.mount_widget(id);
        info!(note = %id, file = file.path(), "Created sticky note from file");

        // The file may already be open in the active editor.
        if let Some(view) = self.active_view.clone() {
            self.on_active_view(Some(view));
        }
        Ok(id)
    }

    /// Remove the widget, the editor subscription and the saved record.
    pub fn delete_note(&mut self, id: NoteId) -> Result<bool> {
        if let Some(mut widget) = self.widgets.remove(&id) {
            widget.unmount();
        }
        self.focus.release(id);
        self.bridge.unbind(id);

        let removed = self.settings.remove(id)?;
        if removed.is_some() {
            info!(note = %id, "Deleted sticky note");
        }
        Ok(removed.is_some())
    }

    /// Show the widget for a saved note, mounting it if this session has
    /// not done so yet.
    pub fn restore_widget(&mut self, id: NoteId) -> bool {
        let mounted = self.widgets.get(&id).is_some_and(Widget::is_mounted);
        if mounted {
            self.grant_focus(id);
            true
        } else {
            self.mount_widget(id)
        }
    }

    // -- Settings panel -----------------------------------------------------

    pub fn set_notes_folder(&mut self, folder: &str) -> Result<()> {
        self.settings.set_notes_folder(folder)
    }

    pub fn set_default_note_color(&mut self, color: &str) -> Result<()> {
        self.settings.set_default_note_color(color)
    }

    // -- Event routing ------------------------------------------------------

    /// React to a host event. Failures only abort the sync step that hit
    /// them and are logged.
    pub fn handle_event(&mut self, event: WorkspaceEvent) {
        match event {
            WorkspaceEvent::ActiveViewChanged(view) => self.on_active_view(view),
            WorkspaceEvent::EditorChanged { editor, content } => {
                self.on_editor_change(editor, content)
            }
            WorkspaceEvent::FileModified(file) => self.on_file_modified(&file),
        }
    }

    /// Feed a UI event to one widget and carry out whatever it asks for.
    pub fn widget_input(&mut self, id: NoteId, input: WidgetInput) -> Result<()> {
        let widget = self
            .widgets
            .get_mut(&id)
            .ok_or_else(|| StickyError::NoteNotFound(id.to_string()))?;

        match input {
            WidgetInput::Focus => {
                self.grant_focus(id);
                return Ok(());
            }
            WidgetInput::Blur(target) => {
                self.arbitrate_blur(id, target);
                return Ok(());
            }
            _ => {}
        }

        match widget.handle(input) {
            Some(WidgetRequest::PersistContent(content)) => {
                self.propagate(id, &content, ContentSource::Local)
            }
            Some(WidgetRequest::StagePosition(position)) => {
                self.settings.stage_position(id, position);
                Ok(())
            }
            Some(WidgetRequest::SavePosition(position)) => {
                self.settings.set_position(id, position)?;
                Ok(())
            }
            Some(WidgetRequest::Delete) => {
                self.delete_note(id)?;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn on_active_view(&mut self, view: Option<ActiveView>) {
        self.active_view = view.clone();

        let Some(ActiveView { editor, file }) = view else {
            return;
        };
        let bound = file
            .as_ref()
            .and_then(|f| self.settings.find_by_linked_file(f.path()))
            .map(|n| n.id);

        match bound {
            Some(id) => {
                self.bridge.bind(id, editor);
            }
            None => {
                let released = self.bridge.release_editor(editor);
                if !released.is_empty() {
                    debug!(editor = %editor, released = released.len(), "Editor moved off note files");
                }
            }
        }
    }

    fn on_editor_change(&mut self, editor: EditorId, content: String) {
        let Some(id) = self.bridge.note_for_editor(editor) else {
            return;
        };
        if let Err(e) = self.propagate(id, &content, ContentSource::Editor) {
            warn!(note = %id, editor = %editor, error = %e, "Editor sync failed");
        }
    }

    fn on_file_modified(&mut self, file: &FileHandle) {
        let Some(id) = self.settings.find_by_linked_file(file.path()).map(|n| n.id) else {
            return;
        };
        let content = match binding::read_file(&self.vault, file.path()) {
            Ok(content) => content,
            Err(e) => {
                warn!(note = %id, path = file.path(), error = %e, "Could not read modified note file");
                return;
            }
        };
        if let Err(e) = self.propagate(id, &content, ContentSource::File) {
            warn!(note = %id, path = file.path(), error = %e, "File sync failed");
        }
    }

    /// Files may have been edited while no coordinator was running. The file
    /// wins over the cached copy; unreadable files keep the cache.
    fn refresh_from_files(&mut self) -> Result<()> {
        let bound: Vec<(NoteId, String)> = self
            .settings
            .notes()
            .iter()
            .map(|n| (n.id, n.linked_file.clone()))
            .collect();

        for (id, path) in bound {
            let content = match binding::read_file(&self.vault, &path) {
                Ok(content) => content,
                Err(e) => {
                    warn!(note = %id, path = %path, error = %e, "Could not read note file");
                    continue;
                }
            };
            let stale = self.settings.find(id).is_some_and(|n| n.content != content);
            if stale {
                debug!(note = %id, path = %path, "Note file changed since last run");
                self.settings.set_content(id, &content)?;
            }
        }
        Ok(())
    }

    /// Move content from `source` to every other place it belongs.
    fn propagate(&mut self, id: NoteId, content: &str, source: ContentSource) -> Result<()> {
        debug!(note = %id, source = %source, bytes = content.len(), "Propagating content");

        match source {
            ContentSource::Local => {
                let Some(path) = self.settings.find(id).map(|n| n.linked_file.clone()) else {
                    return Ok(());
                };
                self.settings.set_content(id, content)?;
                binding::write_file(&mut self.vault, &path, content)?;
            }
            ContentSource::Editor => {
                // Do not clobber what the user is typing into the widget.
                if let Some(widget) = self.widgets.get_mut(&id) {
                    if !widget.has_focus() {
                        widget.update_content(content, false);
                    }
                }
                self.settings.set_content(id, content)?;
            }
            ContentSource::File => {
                if let Some(widget) = self.widgets.get_mut(&id) {
                    widget.update_content(content, false);
                }
                self.settings.set_content(id, content)?;
            }
        }
        Ok(())
    }

    fn create_note(&mut self, note: Note) -> Result<NoteId> {
        let (file, outcome) = binding::ensure_file(&mut self.vault, &note)?;
        self.notices.push(match outcome {
            EnsureOutcome::Created => format!("Created note file: {}", file.path()),
            EnsureOutcome::Overwritten => format!("Updated existing note file: {}", file.path()),
        });

        let id = note.id;
        self.settings.insert(note)?;
        self.mount_widget(id);
        info!(note = %id, file = file.path(), "Created sticky note");
        Ok(id)
    }

    fn mount_widget(&mut self, id: NoteId) -> bool {
        let Some(note) = self.settings.find(id) else {
            return false;
        };
        let widget = Widget::mount(note, self.viewport.clamp(note.position));
        self.widgets.insert(id, widget);
        self.grant_focus(id);
        true
    }

    fn grant_focus(&mut self, id: NoteId) {
        if let Some(prev) = self.focus.grant(id) {
            if let Some(widget) = self.widgets.get_mut(&prev) {
                widget.set_focused(false);
            }
        }
        if let Some(widget) = self.widgets.get_mut(&id) {
            widget.handle(WidgetInput::Focus);
        }
    }

    fn arbitrate_blur(&mut self, id: NoteId, target: BlurTarget) {
        let retained = self.focus.on_blur(id, target);
        if let Some(widget) = self.widgets.get_mut(&id) {
            widget.set_focused(retained);
        }
        if let BlurTarget::OtherWidget(other) = target {
            if self.focus.owner() == Some(other) {
                if let Some(widget) = self.widgets.get_mut(&other) {
                    widget.set_focused(true);
                }
            }
        }
    }
}
