// src/types.rs

use std::fmt;

/// Behaviour when a command from a new batch is still running from an
/// earlier batch.
///
/// - `Allow`: start another instance alongside the running one (default).
/// - `NoRestart`: refuse to start a second instance of the same command
///   string. The running instance is never killed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    #[default]
    Allow,
    NoRestart,
}

/// Whether a batch may start while commands from earlier batches are
/// still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerPolicy {
    /// Every qualifying event may start a batch.
    #[default]
    Always,
    /// Batches are skipped entirely while anything is still running.
    WhenIdle,
}

/// Kind of a file-system notification, as shown in log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Add,
    Change,
    Unlink,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Add => "add",
            ChangeKind::Change => "change",
            ChangeKind::Unlink => "unlink",
        };
        f.write_str(s)
    }
}
