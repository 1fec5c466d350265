use std::env;
use std::io;
use std::path::PathBuf;

use tracing::info;

use crate::coordinator::Coordinator;
use crate::entity::{Note, NoteId, Position, Viewport};
use crate::error::{Result, StickyError};
use crate::storage::{JsonFileStore, STICKIES_DIR};
use crate::vault::FsVault;
use crate::watch::{self, VaultWatcher};
use crate::widget::{Key, WidgetFrame, WidgetInput};

type FsCoordinator = Coordinator<FsVault, JsonFileStore>;

/// Per-invocation host facts: which vault, how big the window is.
#[derive(Debug, Clone)]
pub struct Session {
    pub root: PathBuf,
    pub viewport: Viewport,
}

impl Session {
    pub fn new(vault: Option<PathBuf>, width: f64, height: f64) -> Self {
        Self {
            root: vault.unwrap_or_else(find_vault_root),
            viewport: Viewport::new(width, height),
        }
    }

    fn start(&self) -> Result<FsCoordinator> {
        Coordinator::start(
            FsVault::new(&self.root),
            JsonFileStore::new(&self.root),
            self.viewport,
        )
    }
}

/// Find the vault root by looking for .stickies/ in the current directory
/// and its ancestors.
fn find_vault_root() -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut current = cwd.as_path();
    loop {
        if current.join(STICKIES_DIR).is_dir() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return cwd,
        }
    }
}

fn print_notices(coordinator: &mut FsCoordinator) {
    for notice in coordinator.take_notices() {
        println!("{}", notice);
    }
}

fn print_note(note: &Note, frame: Option<&WidgetFrame>) {
    let (x, y) = frame
        .map(|f| (f.x, f.y))
        .unwrap_or((note.position.x, note.position.y));
    println!(
        "  {} {} @ ({:.0}, {:.0})",
        note.short_id(),
        note.linked_file,
        x,
        y
    );
}

fn print_created(coordinator: &FsCoordinator, id: NoteId, json: bool) -> Result<()> {
    let note = coordinator
        .settings()
        .find(id)
        .ok_or_else(|| StickyError::NoteNotFound(id.to_string()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(note)?);
    } else {
        println!(
            "Sticky note {} ({}) -> {}",
            note.short_id(),
            note.id,
            note.linked_file
        );
    }
    Ok(())
}

pub fn handle_new(session: &Session, json: bool) -> Result<()> {
    let mut coordinator = session.start()?;

    let result = coordinator.create_new_note();
    if !json {
        print_notices(&mut coordinator);
    }
    let id = result?;

    print_created(&coordinator, id, json)
}

pub fn handle_from(session: &Session, file: String, json: bool) -> Result<()> {
    let mut coordinator = session.start()?;

    let id = coordinator.create_from_file(&file)?;
    if !json {
        print_notices(&mut coordinator);
    }

    print_created(&coordinator, id, json)
}

pub fn handle_list(session: &Session, json: bool) -> Result<()> {
    let coordinator = session.start()?;
    let notes = coordinator.settings().notes();

    if json {
        println!("{}", serde_json::to_string_pretty(notes)?);
    } else if notes.is_empty() {
        println!("No sticky notes found.");
    } else {
        let frames = coordinator.frames();
        println!("Sticky notes:\n");
        for note in notes {
            print_note(note, frames.iter().find(|f| f.id == note.id));
        }
    }

    Ok(())
}

pub fn handle_show(session: &Session, id: String, json: bool) -> Result<()> {
    let coordinator = session.start()?;
    let id = coordinator.settings().resolve_id(&id)?;
    let note = coordinator
        .settings()
        .find(id)
        .ok_or_else(|| StickyError::NoteNotFound(id.to_string()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(note)?);
    } else {
        println!("Sticky note {}", note.id);
        println!("File: {}", note.linked_file);
        println!("Position: ({:.0}, {:.0})", note.position.x, note.position.y);
        if !note.content.is_empty() {
            println!("\n{}", note.content);
        }
    }

    Ok(())
}

/// Turn typed text into keystrokes. A literal `\n` is the Enter key.
fn keystrokes(text: &str) -> Vec<Key> {
    let mut keys = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'n') {
            chars.next();
            keys.push(Key::Enter);
        } else {
            keys.push(Key::Char(c));
        }
    }
    keys
}

pub fn handle_type(session: &Session, id: String, text: String) -> Result<()> {
    let mut coordinator = session.start()?;
    let id = coordinator.settings().resolve_id(&id)?;

    for key in keystrokes(&text) {
        coordinator.widget_input(id, WidgetInput::Key(key))?;
    }

    let content = coordinator
        .widget(id)
        .map(|w| w.text().to_string())
        .unwrap_or_default();
    info!(note = %id, bytes = content.len(), "Typed into sticky note");
    println!("{}", content);
    Ok(())
}

pub fn handle_move(session: &Session, id: String, x: f64, y: f64) -> Result<()> {
    let mut coordinator = session.start()?;
    let id = coordinator.settings().resolve_id(&id)?;
    let start = coordinator
        .widget(id)
        .map(|w| w.position())
        .unwrap_or_default();

    // Grab the header at the widget's corner so the corner lands on (x, y).
    coordinator.widget_input(id, WidgetInput::PointerDownHeader { x: start.x, y: start.y })?;
    coordinator.widget_input(id, WidgetInput::PointerMove { x, y })?;
    coordinator.widget_input(id, WidgetInput::PointerUp)?;

    let position = coordinator
        .settings()
        .find(id)
        .map(|n| n.position)
        .unwrap_or(Position::new(x, y));
    println!("Moved {} to ({:.0}, {:.0})", id.short(), position.x, position.y);
    Ok(())
}

pub fn handle_delete(session: &Session, id: String, force: bool) -> Result<()> {
    let mut coordinator = session.start()?;
    let id = coordinator.settings().resolve_id(&id)?;
    let linked_file = coordinator
        .settings()
        .find(id)
        .map(|n| n.linked_file.clone())
        .unwrap_or_default();

    // Confirm deletion unless --force is used
    if !force {
        eprintln!("Delete sticky note {} ({})? [y/N] ", id.short(), linked_file);

        if atty::is(atty::Stream::Stdin) {
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Cancelled.");
                return Ok(());
            }
        } else {
            return Err(StickyError::Storage(
                "Use --force to delete in non-interactive mode".to_string(),
            ));
        }
    }

    coordinator.widget_input(id, WidgetInput::DeleteClicked)?;

    println!("Deleted sticky note {} ({})", id.short(), linked_file);
    Ok(())
}

pub fn handle_config(
    session: &Session,
    notes_folder: Option<String>,
    default_color: Option<String>,
) -> Result<()> {
    let mut coordinator = session.start()?;

    if let Some(folder) = notes_folder {
        coordinator.set_notes_folder(&folder)?;
    }
    if let Some(color) = default_color {
        coordinator.set_default_note_color(&color)?;
    }

    let settings = coordinator.settings();
    println!("Notes folder: {}", settings.notes_folder());
    println!("Default note color: {}", settings.default_note_color());
    Ok(())
}

pub fn handle_watch(session: &Session) -> Result<()> {
    let mut coordinator = session.start()?;
    let (_watcher, changes) = VaultWatcher::start(&session.root)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    println!(
        "Watching {} ({} sticky notes). Press Ctrl-C to stop.",
        session.root.display(),
        coordinator.settings().notes().len()
    );
    runtime.block_on(watch::run(&mut coordinator, changes, tokio::signal::ctrl_c()))
}
