//! File watcher for the sample root.
//!
//! Uses the notify crate to watch the root and forwards only the
//! events that can change a manifest: files and folders appearing or
//! disappearing at most one level below the root.

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::future::Future;
use std::path::{Path, PathBuf};
use strudel_core::MANIFEST_FILE_NAME;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing::{debug, info, warn};

/// Deepest level below the root that is observed: the root's direct
/// children and the entries inside them.
const MAX_DEPTH: usize = 2;

/// A filesystem change relevant to the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    FileAdded(PathBuf),
    FileRemoved(PathBuf),
    DirAdded(PathBuf),
    DirRemoved(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::FileAdded(p) | Self::FileRemoved(p) | Self::DirAdded(p) | Self::DirRemoved(p) => {
                p
            }
        }
    }
}

impl std::fmt::Display for WatchEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileAdded(p) => write!(f, "File added: {}", p.display()),
            Self::FileRemoved(p) => write!(f, "File removed: {}", p.display()),
            Self::DirAdded(p) => write!(f, "Directory added: {}", p.display()),
            Self::DirRemoved(p) => write!(f, "Directory removed: {}", p.display()),
        }
    }
}

/// Anything the watch loop can pull events from.
///
/// Returns None once the source is closed.
pub trait EventSource {
    fn next_event(&mut self) -> impl Future<Output = Option<WatchEvent>> + Send;
}

impl EventSource for UnboundedReceiver<WatchEvent> {
    fn next_event(&mut self) -> impl Future<Output = Option<WatchEvent>> + Send {
        self.recv()
    }
}

/// Watches a sample root for added and removed entries.
///
/// Only the root and its direct child folders carry an OS watch, so
/// deep sample libraries do not use up watch handles. Child folders
/// added later are picked up as their events come through.
/// Dropping the watcher closes the OS subscription.
pub struct FileWatcher {
    watcher: notify::RecommendedWatcher,
    roots: Vec<PathBuf>,
    receiver: UnboundedReceiver<WatchEvent>,
}

impl FileWatcher {
    /// Creates a new file watcher for the given root.
    pub fn new(root: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = unbounded_channel();
        let roots = watch_roots(root);
        let callback_roots = roots.clone();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    for change in classify(&callback_roots, &event) {
                        debug!("{}", change);
                        if tx.send(change).is_err() {
                            warn!("Failed to send file change event");
                        }
                    }
                }
                Err(e) => warn!("Watcher error: {}", e),
            }
        })?;

        watcher.watch(root, RecursiveMode::NonRecursive)?;

        for entry in std::fs::read_dir(root).map_err(notify::Error::io)? {
            let entry = entry.map_err(notify::Error::io)?;
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                watcher.watch(&entry.path(), RecursiveMode::NonRecursive)?;
            }
        }

        info!("Watching {} for changes", root.display());

        Ok(Self {
            watcher,
            roots,
            receiver: rx,
        })
    }

    /// Adds or drops the watch on a direct child folder.
    fn track(&mut self, change: &WatchEvent) {
        let is_child = |path: &Path| {
            path.parent()
                .map(|parent| self.roots.iter().any(|root| root == parent))
                .unwrap_or(false)
        };

        match change {
            WatchEvent::DirAdded(path) if is_child(path) => {
                if let Err(e) = self.watcher.watch(path, RecursiveMode::NonRecursive) {
                    warn!("Failed to watch {}: {}", path.display(), e);
                }
            }
            WatchEvent::DirRemoved(path) if is_child(path) => {
                // The OS usually drops the watch on its own
                let _ = self.watcher.unwatch(path);
            }
            _ => {}
        }
    }
}

impl EventSource for FileWatcher {
    fn next_event(&mut self) -> impl Future<Output = Option<WatchEvent>> + Send {
        async move {
            let change = self.receiver.recv().await?;
            self.track(&change);
            Some(change)
        }
    }
}

/// The root as given plus its canonical form, since some backends
/// report canonical paths.
fn watch_roots(root: &Path) -> Vec<PathBuf> {
    let mut roots = vec![root.to_path_buf()];
    if let Ok(canonical) = root.canonicalize() {
        if canonical != root {
            roots.push(canonical);
        }
    }
    roots
}

/// Turns a raw notify event into the changes the loop cares about.
///
/// Drops events on the manifest itself, events deeper than
/// `MAX_DEPTH`, and content modifications. A rename counts as a
/// removal of the old name and an addition of the new one.
pub fn classify(roots: &[PathBuf], event: &Event) -> Vec<WatchEvent> {
    let mut changes = Vec::new();

    match event.kind {
        EventKind::Create(kind) => {
            for path in &event.paths {
                let is_dir = match kind {
                    CreateKind::Folder => true,
                    CreateKind::File => false,
                    _ => path.is_dir(),
                };
                changes.push(added(path, is_dir));
            }
        }
        EventKind::Remove(kind) => {
            for path in &event.paths {
                changes.push(removed(path, kind == RemoveKind::Folder));
            }
        }
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => {
                for path in &event.paths {
                    changes.push(removed(path, false));
                }
            }
            RenameMode::To => {
                for path in &event.paths {
                    changes.push(added(path, path.is_dir()));
                }
            }
            RenameMode::Both => {
                if let [from, to, ..] = event.paths.as_slice() {
                    let is_dir = to.is_dir();
                    changes.push(removed(from, is_dir));
                    changes.push(added(to, is_dir));
                }
            }
            _ => {
                for path in &event.paths {
                    if path.exists() {
                        changes.push(added(path, path.is_dir()));
                    } else {
                        changes.push(removed(path, false));
                    }
                }
            }
        },
        _ => {}
    }

    changes.retain(|change| is_observed(roots, change.path()));
    changes
}

fn added(path: &Path, is_dir: bool) -> WatchEvent {
    if is_dir {
        WatchEvent::DirAdded(path.to_path_buf())
    } else {
        WatchEvent::FileAdded(path.to_path_buf())
    }
}

fn removed(path: &Path, is_dir: bool) -> WatchEvent {
    if is_dir {
        WatchEvent::DirRemoved(path.to_path_buf())
    } else {
        WatchEvent::FileRemoved(path.to_path_buf())
    }
}

fn is_observed(roots: &[PathBuf], path: &Path) -> bool {
    if path.file_name().map(|n| n == MANIFEST_FILE_NAME).unwrap_or(false) {
        return false;
    }

    roots.iter().any(|root| match path.strip_prefix(root) {
        Ok(rel) => {
            let depth = rel.components().count();
            depth > 0 && depth <= MAX_DEPTH
        }
        Err(_) => false,
    })
}
