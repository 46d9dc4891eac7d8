// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Turning raw `notify` events into typed [`WatchEvent`]s, with a synthetic
//!   "initial scan complete" signal.
//! - Tracking ignore-definition files and rebuilding rule sets when they
//!   change.
//! - Filtering primary events through the current rule sets and debouncing
//!   trigger attempts.
//!
//! It does **not** start processes; it only decides when a batch of commands
//! should be attempted.

pub mod debounce;
pub mod ignore_files;
pub mod path_utils;
pub mod primary;
pub mod source;

pub use debounce::{Debounce, Debouncer};
pub use ignore_files::{IgnoreFileWatchState, RuleReloader, spawn_ignore_file_watcher};
pub use primary::PrimaryWatcher;
pub use source::{
    EventSource, NotifySource, SourceMessage, Subscription, SubscriptionOptions, WatchEvent,
};
