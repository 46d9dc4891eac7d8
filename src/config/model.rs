// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use crate::types::{OverlapPolicy, TriggerPolicy};

/// Program prefixed to every `--exec` command.
pub const CARGO: &str = "cargo";
/// Cargo command used when neither `--exec` nor `--shell` is given.
pub const DEFAULT_EXEC: &str = "check";
/// Git-style ignore file name.
pub const GIT_IGNORE: &str = ".gitignore";
/// Generic ignore file name (as used by ripgrep and friends).
pub const DOT_IGNORE: &str = ".ignore";

/// Resolved configuration, built once at startup and never mutated.
///
/// Each component receives what it needs from this value at construction
/// time.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Canonical file or directory being watched.
    pub watch_root: PathBuf,

    /// Minimum spacing between trigger attempts.
    pub delay: Duration,

    /// When set, no ignore rules apply at all.
    pub ignore_nothing: bool,

    /// Extra patterns appended to the built-in rule set (`--ignore`).
    pub extra_ignores: Vec<String>,

    /// Ignore-file names to discover and watch, in priority order.
    pub ignore_files: Vec<String>,

    pub overlap: OverlapPolicy,

    pub trigger: TriggerPolicy,

    /// Full command lines: `cargo <exec>` entries first, then shell entries.
    pub commands: Vec<String>,

    /// Clear the screen before each batch.
    pub clear: bool,

    /// Skip the run that normally happens once the watch is ready.
    pub postpone: bool,

    /// Use the polling backend.
    pub poll: bool,

    /// Directory the process switches to before anything is watched.
    pub workdir: PathBuf,

    /// Shell used to run command lines (`--use-shell`).
    pub shell: Option<String>,
}

impl WatchConfig {
    /// Whether any ignore-definition file needs watching.
    pub fn watches_ignore_files(&self) -> bool {
        !self.ignore_nothing && !self.ignore_files.is_empty()
    }

    /// Base directory of the built-in rule set: the watch root, or its
    /// parent when a single file is watched.
    pub fn rules_root(&self) -> PathBuf {
        if self.watch_root.is_file() {
            self.watch_root
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| self.watch_root.clone())
        } else {
            self.watch_root.clone()
        }
    }
}
