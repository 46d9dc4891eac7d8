// src/config/loader.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::model::WatchConfig;
use crate::errors::Result;
use crate::fs::FileSystem;

/// Manifest file marking a crate root.
pub const MANIFEST: &str = "Cargo.toml";

/// Find the crate root for `start`: the nearest ancestor (including `start`
/// itself) containing `Cargo.toml`. Falls back to `start` when there is none.
pub fn locate_project_root(fs: &dyn FileSystem, start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| fs.is_file(&dir.join(MANIFEST)))
        .map(Path::to_path_buf)
        .unwrap_or_else(|| start.to_path_buf())
}

/// Resolve CLI arguments against the invocation directory `cwd`.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Locates the crate root (used when `--workdir` is absent).
/// - Validates flags and builds the command list.
/// - Canonicalizes the working directory and watch root.
pub fn load_config(args: CliArgs, cwd: &Path, fs: &dyn FileSystem) -> Result<WatchConfig> {
    let project_root = locate_project_root(fs, cwd);
    debug!(?cwd, ?project_root, "resolved crate root");
    WatchConfig::from_args(args, &project_root, fs)
}
