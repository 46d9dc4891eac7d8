// src/watch/source.rs

//! Typed file-system event source on top of `notify`.
//!
//! `notify` reports raw, platform-flavoured events and has no notion of an
//! initial scan. This module narrows them to [`WatchEvent`]s and appends an
//! [`WatchEvent::InitialScanComplete`] once the subscription is live and the
//! optional discovery pass has reported every pre-existing file.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::{Config, Event, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::types::ChangeKind;

/// Interval used when polling is forced with `--poll`.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A single notification from a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Added(PathBuf),
    Changed(PathBuf),
    Removed(PathBuf),
    /// Every file that existed when the subscription started has been
    /// reported. Sent once per subscription.
    InitialScanComplete,
}

impl WatchEvent {
    pub fn path(&self) -> Option<&Path> {
        match self {
            WatchEvent::Added(p) | WatchEvent::Changed(p) | WatchEvent::Removed(p) => Some(p),
            WatchEvent::InitialScanComplete => None,
        }
    }

    pub fn kind(&self) -> Option<ChangeKind> {
        match self {
            WatchEvent::Added(_) => Some(ChangeKind::Add),
            WatchEvent::Changed(_) => Some(ChangeKind::Change),
            WatchEvent::Removed(_) => Some(ChangeKind::Unlink),
            WatchEvent::InitialScanComplete => None,
        }
    }
}

/// What travels over a subscription channel. Errors come from the live
/// `notify` backend.
pub type SourceMessage = std::result::Result<WatchEvent, notify::Error>;

/// Whether a runtime `notify` error leaves the watch unusable.
pub fn is_fatal(err: &notify::Error) -> bool {
    matches!(err.kind, notify::ErrorKind::MaxFilesWatch)
}

/// Map a raw `notify` event to zero or more [`WatchEvent`]s.
pub fn translate(event: &Event) -> Vec<WatchEvent> {
    let paths = event.paths.iter().cloned();
    match event.kind {
        EventKind::Create(_) => paths.map(WatchEvent::Added).collect(),
        EventKind::Remove(_) => paths.map(WatchEvent::Removed).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            paths.map(WatchEvent::Removed).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            paths.map(WatchEvent::Added).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            // paths = [from, to]
            let mut out = Vec::with_capacity(2);
            if let Some(from) = event.paths.first() {
                out.push(WatchEvent::Removed(from.clone()));
            }
            if let Some(to) = event.paths.get(1) {
                out.push(WatchEvent::Added(to.clone()));
            }
            out
        }
        EventKind::Modify(ModifyKind::Name(_)) => paths
            .map(|p| {
                if p.exists() {
                    WatchEvent::Added(p)
                } else {
                    WatchEvent::Removed(p)
                }
            })
            .collect(),
        EventKind::Modify(_) | EventKind::Any => paths.map(WatchEvent::Changed).collect(),
        EventKind::Access(_) | EventKind::Other => Vec::new(),
    }
}

/// Settings for one subscription.
#[derive(Debug, Clone)]
pub struct SubscriptionOptions {
    /// File or directory to watch (recursively).
    pub root: PathBuf,
    /// Use `notify`'s polling backend instead of native notifications.
    pub poll: bool,
    /// Report pre-existing files with these names as `Added` before
    /// `InitialScanComplete`. Empty means no discovery pass.
    pub discover: Vec<String>,
}

/// A live subscription. Dropping it stops the underlying watcher.
pub struct Subscription {
    _inner: Box<dyn Watcher + Send>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish()
    }
}

/// Something that can open subscriptions. The runtime and the ignore-file
/// watcher go through this so tests can feed events by hand.
pub trait EventSource: Send {
    type Handle: Send;

    fn subscribe(
        &mut self,
        options: &SubscriptionOptions,
        tx: mpsc::UnboundedSender<SourceMessage>,
    ) -> Result<Self::Handle>;
}

/// Production source backed by `notify`.
#[derive(Debug, Clone)]
pub struct NotifySource {
    fs: Arc<dyn FileSystem>,
}

impl NotifySource {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

impl EventSource for NotifySource {
    type Handle = Subscription;

    fn subscribe(
        &mut self,
        options: &SubscriptionOptions,
        tx: mpsc::UnboundedSender<SourceMessage>,
    ) -> Result<Subscription> {
        let handler = {
            let tx = tx.clone();
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for ev in translate(&event) {
                        // Receiver gone means the watcher is shutting down.
                        let _ = tx.send(Ok(ev));
                    }
                }
                Err(err) => {
                    let _ = tx.send(Err(err));
                }
            }
        };

        // notify follows symlinks by default when recursing.
        let mut watcher: Box<dyn Watcher + Send> = if options.poll {
            Box::new(PollWatcher::new(
                handler,
                Config::default().with_poll_interval(POLL_INTERVAL),
            )?)
        } else {
            Box::new(RecommendedWatcher::new(handler, Config::default())?)
        };
        watcher.watch(&options.root, RecursiveMode::Recursive)?;

        info!(root = ?options.root, poll = options.poll, "file watch subscription started");

        let fs = Arc::clone(&self.fs);
        let root = options.root.clone();
        let names = options.discover.clone();
        tokio::task::spawn_blocking(move || {
            if !names.is_empty() {
                for path in discover_files(fs.as_ref(), &root, &names) {
                    debug!(?path, "discovered");
                    if tx.send(Ok(WatchEvent::Added(path))).is_err() {
                        return;
                    }
                }
            }
            let _ = tx.send(Ok(WatchEvent::InitialScanComplete));
        });

        Ok(Subscription { _inner: watcher })
    }
}

/// Breadth-first search under `root` for files named one of `names`.
///
/// Directories named in `SKIP_DIRS` are not descended into. Directory
/// symlinks are followed; a directory reached twice through different links
/// is only walked once.
pub fn discover_files(fs: &dyn FileSystem, root: &Path, names: &[String]) -> Vec<PathBuf> {
    use std::collections::{HashSet, VecDeque};

    use crate::watch::path_utils::{SKIP_DIRS, has_file_name};

    let mut found = Vec::new();
    if fs.is_file(root) {
        if has_file_name(root, names) {
            found.push(root.to_path_buf());
        }
        return found;
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([root.to_path_buf()]);

    while let Some(dir) = queue.pop_front() {
        let canon = fs.canonicalize(&dir).unwrap_or_else(|_| dir.clone());
        if !visited.insert(canon) {
            continue;
        }

        let entries = match fs.read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(?dir, error = %err, "cannot list directory during discovery");
                continue;
            }
        };

        for path in entries {
            if fs.is_dir(&path) {
                let skip = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| SKIP_DIRS.contains(&n));
                if !skip {
                    queue.push_back(path);
                }
            } else if fs.is_file(&path) && has_file_name(&path, names) {
                found.push(path);
            }
        }
    }

    found
}
