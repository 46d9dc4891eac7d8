// src/engine/mod.rs

//! Orchestration engine for cargo-watch-plus.
//!
//! This module ties together:
//! - the primary watcher (ignore filtering, readiness, debounce)
//! - the command supervisor (running set, overlap and idle policies)
//! - the main runtime event loop that reacts to:
//!   - rule set snapshots from the ignore-file watcher
//!   - file-system events from the primary subscription
//!   - command exits
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::filter::IgnoreRuleSet;
use crate::watch::WatchEvent;

/// Command identity: the literal command string.
pub type CommandName = String;

/// How a command ended, for bookkeeping only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Success,
    /// Non-zero exit; `None` when terminated by a signal.
    Failed(Option<i32>),
    /// The process could not be started at all.
    SpawnFailed(String),
}

/// Events flowing into the core runtime.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A fresh, complete list of rule sets from the ignore-file watcher.
    RulesReloaded(Vec<IgnoreRuleSet>),
    /// A notification from the primary subscription.
    Source(WatchEvent),
    /// A spawned command finished (or failed to start).
    CommandExited {
        command: CommandName,
        outcome: CommandOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod runtime;

pub use core::{CoreCommand, CoreRuntime, CoreStep};
pub use runtime::Runtime;
