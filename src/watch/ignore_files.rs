// src/watch/ignore_files.rs

//! Watching ignore-definition files and rebuilding the rule sets.
//!
//! [`IgnoreFileWatchState`] is the pure part: it tracks which ignore files
//! exist and says when a reload is due. [`spawn_ignore_file_watcher`] runs it
//! on its own task, reloads on the blocking pool and sends every new
//! snapshot to the runtime.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::WatchConfig;
use crate::errors::{Result, WatchPlusError};
use crate::filter::{IgnoreRuleSet, load_rule_sets};
use crate::fs::FileSystem;
use crate::watch::path_utils::{has_file_name, in_skipped_dir};
use crate::watch::source::{EventSource, SubscriptionOptions, WatchEvent, is_fatal};

/// Discovery progress and the ignore files currently known to exist.
#[derive(Debug, Clone)]
pub struct IgnoreFileWatchState {
    root: PathBuf,
    names: Vec<String>,
    ready: bool,
    known_files: Vec<PathBuf>,
}

impl IgnoreFileWatchState {
    pub fn new(root: impl Into<PathBuf>, names: Vec<String>) -> Self {
        Self {
            root: root.into(),
            names,
            ready: false,
            known_files: Vec::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Known ignore files, in discovery order.
    pub fn known_files(&self) -> &[PathBuf] {
        &self.known_files
    }

    /// Apply one event; returns whether the rule sets must be rebuilt.
    pub fn step(&mut self, event: &WatchEvent) -> bool {
        match event {
            WatchEvent::InitialScanComplete => {
                if self.ready {
                    return false;
                }
                self.ready = true;
                info!(count = self.known_files.len(), "ignore files discovered");
                true
            }
            WatchEvent::Added(path) | WatchEvent::Changed(path) => {
                if !has_file_name(path, &self.names) || in_skipped_dir(&self.root, path) {
                    return false;
                }
                if !self.known_files.contains(path) {
                    debug!(?path, "ignore file found");
                    self.known_files.push(path.clone());
                }
                self.ready
            }
            WatchEvent::Removed(path) => {
                // A removed directory takes every ignore file below it along.
                let before = self.known_files.len();
                self.known_files.retain(|f| !f.starts_with(path));
                let dropped = self.known_files.len() != before;
                if dropped {
                    debug!(?path, "ignore file gone");
                }
                self.ready && (dropped || has_file_name(path, &self.names))
            }
        }
    }
}

/// Builds complete rule set snapshots from a list of ignore files.
#[derive(Debug, Clone)]
pub struct RuleReloader {
    fs: Arc<dyn FileSystem>,
    /// `None` in ignore-nothing mode.
    built_in: Option<IgnoreRuleSet>,
}

impl RuleReloader {
    pub fn new(fs: Arc<dyn FileSystem>, config: &WatchConfig) -> Result<Self> {
        let built_in = if config.ignore_nothing {
            None
        } else {
            Some(IgnoreRuleSet::built_in(
                config.rules_root(),
                &config.extra_ignores,
            )?)
        };
        Ok(Self { fs, built_in })
    }

    /// Per-file sets in the given order, then the built-in set.
    ///
    /// Ignore-nothing mode yields an empty snapshot.
    pub fn reload(&self, files: &[PathBuf]) -> Vec<IgnoreRuleSet> {
        let Some(built_in) = &self.built_in else {
            return Vec::new();
        };
        let mut sets = load_rule_sets(self.fs.as_ref(), files);
        sets.push(built_in.clone());
        sets
    }
}

/// Start the ignore-file watcher task.
///
/// The subscription is opened before this returns, so watch initialisation
/// errors surface to the caller. The task ends with an error only on a
/// fatal watch error, and with `Ok` once the runtime stops listening.
///
/// When no ignore file is watched (ignore-nothing mode, or both kinds
/// disabled) a single snapshot is sent and the task ends right away.
pub fn spawn_ignore_file_watcher<S>(
    config: &WatchConfig,
    mut source: S,
    fs: Arc<dyn FileSystem>,
    rules_tx: mpsc::UnboundedSender<Vec<IgnoreRuleSet>>,
) -> Result<JoinHandle<Result<()>>>
where
    S: EventSource + 'static,
    S::Handle: 'static,
{
    let reloader = RuleReloader::new(fs, config)?;

    if !config.watches_ignore_files() {
        debug!("no ignore files to watch");
        let rules = reloader.reload(&[]);
        return Ok(tokio::spawn(async move {
            let _ = rules_tx.send(rules);
            Ok(())
        }));
    }

    let options = SubscriptionOptions {
        root: config.watch_root.clone(),
        poll: config.poll,
        discover: config.ignore_files.clone(),
    };
    let (tx, mut rx) = mpsc::unbounded_channel();
    let subscription = source.subscribe(&options, tx)?;
    let mut state = IgnoreFileWatchState::new(&config.watch_root, config.ignore_files.clone());

    Ok(tokio::spawn(async move {
        let _subscription = subscription;

        while let Some(message) = rx.recv().await {
            let event = match message {
                Ok(event) => event,
                Err(err) if is_fatal(&err) => return Err(WatchPlusError::WatchError(err)),
                Err(err) => {
                    warn!(error = %err, "ignore file watch error");
                    continue;
                }
            };

            if !state.step(&event) {
                continue;
            }

            let files = state.known_files().to_vec();
            let reloader = reloader.clone();
            let rules = tokio::task::spawn_blocking(move || reloader.reload(&files))
                .await
                .map_err(|err| WatchPlusError::Other(err.into()))?;

            debug!(count = rules.len(), "ignore rules rebuilt");
            if rules_tx.send(rules).is_err() {
                debug!("runtime stopped listening for ignore rules");
                break;
            }
        }

        Ok(())
    }))
}
