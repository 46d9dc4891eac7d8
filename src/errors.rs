// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchPlusError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An ignore file vanished or became unreadable between discovery and
    /// load. Recovered by skipping the file for the current reload.
    #[error("failed to read ignore file {path:?}: {reason}")]
    IgnoreFileRead { path: PathBuf, reason: String },

    #[error("failed to start command '{command}': {source}")]
    SpawnError {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("file watch error: {0}")]
    WatchError(#[from] notify::Error),

    #[error("ignore pattern error: {0}")]
    PatternError(#[from] ignore::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WatchPlusError>;
