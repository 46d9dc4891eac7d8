// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`supervisor`] decides which commands run for a trigger and tracks the
//!   running set.
//! - [`command`] splits command strings and builds `tokio::process::Command`s.
//! - [`backend`] provides the `CommandSpawner` trait and the production
//!   `ProcessSpawner`, which tests replace with a fake implementation.

pub mod backend;
pub mod command;
pub mod supervisor;

pub use backend::{CommandSpawner, ProcessSpawner};
pub use command::{CommandLine, build_command};
pub use supervisor::{CommandSupervisor, SupervisorAction};
