//! Filesystem watching and the single-threaded event loop.
//!
//! The notify callback runs on its own thread and only forwards vault paths
//! over a channel. Every coordinator call happens on the loop in [`run`], so
//! events are handled strictly one at a time.

use std::future::Future;
use std::path::{Component, Path};

use notify::event::ModifyKind;
use notify::{recommended_watcher, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing::{debug, info, warn};

use crate::coordinator::Coordinator;
use crate::error::Result;
use crate::event::WorkspaceEvent;
use crate::storage::{DataStore, STICKIES_DIR};
use crate::vault::{FileHandle, FsVault, Vault};

/// Watches a vault directory and reports changed markdown files as
/// vault-relative paths.
pub struct VaultWatcher {
    _watcher: RecommendedWatcher,
}

impl VaultWatcher {
    pub fn start(root: &Path) -> Result<(Self, UnboundedReceiver<String>)> {
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let resolver = FsVault::new(root.clone());
        let (tx, rx) = unbounded_channel();

        let mut watcher = recommended_watcher(move |res: notify::Result<notify::Event>| match res {
            Ok(event) => {
                if !is_relevant_event(&event.kind) {
                    return;
                }
                for path in &event.paths {
                    if !is_note_candidate(path) {
                        continue;
                    }
                    if let Some(relative) = resolver.relative_path(path) {
                        // Receiver gone means the loop has stopped.
                        let _ = tx.send(relative);
                    }
                }
            }
            Err(e) => warn!(error = %e, watcher = "vault", "File watcher error"),
        })?;

        watcher.watch(&root, RecursiveMode::Recursive)?;
        info!(path = %root.display(), "Vault watcher started");

        Ok((Self { _watcher: watcher }, rx))
    }
}

fn is_relevant_event(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    }
}

/// Markdown files outside the settings directory.
fn is_note_candidate(path: &Path) -> bool {
    let is_markdown = path.extension().and_then(|e| e.to_str()) == Some("md");
    let in_data_dir = path
        .components()
        .any(|c| matches!(c, Component::Normal(name) if name == STICKIES_DIR));
    is_markdown && !in_data_dir
}

/// Feed changed paths into the coordinator until `shutdown` resolves or
/// the channel closes, then shut the coordinator down. Settings are reloaded
/// before each change so saves from other processes are not overwritten.
pub async fn run<V, D, F>(
    coordinator: &mut Coordinator<V, D>,
    mut changes: UnboundedReceiver<String>,
    shutdown: F,
) -> Result<()>
where
    V: Vault,
    D: DataStore,
    F: Future,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = changes.recv() => {
                let Some(path) = changed else {
                    debug!("Change channel closed");
                    break;
                };
                // Other stickies commands may have saved since the last event.
                if let Err(e) = coordinator.reload_settings() {
                    warn!(error = %e, "Could not reload settings, keeping the loaded copy");
                }
                coordinator.handle_event(WorkspaceEvent::FileModified(FileHandle::new(path)));
                for notice in coordinator.take_notices() {
                    info!(notice = %notice, "Notice");
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    coordinator.shutdown();
    Ok(())
}
