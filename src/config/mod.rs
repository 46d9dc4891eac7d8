// src/config/mod.rs

//! Configuration for cargo-watch-plus.
//!
//! Responsibilities:
//! - Define the resolved, immutable configuration (`model.rs`).
//! - Locate the crate root and build the configuration (`loader.rs`).
//! - Turn CLI arguments into a validated configuration (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_config, locate_project_root};
pub use model::{CARGO, DEFAULT_EXEC, DOT_IGNORE, GIT_IGNORE, WatchConfig};
