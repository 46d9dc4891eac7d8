// src/exec/backend.rs

//! Pluggable process backend.
//!
//! The runtime talks to a `CommandSpawner` instead of `tokio::process`
//! directly, so tests can swap in a fake that records what would have run.
//!
//! - `ProcessSpawner` is the implementation used by `cargo-watch-plus`. It
//!   starts real processes and reports each exit back to the runtime as a
//!   `RuntimeEvent::CommandExited`.
//! - Tests provide their own `CommandSpawner` that, for example, records
//!   spawned commands and completes them on demand.

use std::io::Write;
use std::path::PathBuf;

use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::engine::{CommandOutcome, RuntimeEvent};
use crate::errors::{Result, WatchPlusError};
use crate::exec::command::build_command;

/// Trait abstracting how commands are started.
pub trait CommandSpawner: Send {
    /// Start `command` without waiting for it.
    ///
    /// On `Ok`, the implementation must eventually deliver exactly one
    /// `RuntimeEvent::CommandExited` for it. On `Err` nothing is delivered;
    /// the caller treats the command as finished.
    fn spawn(&mut self, command: &str) -> Result<()>;

    /// Clear the terminal before a batch.
    fn clear_screen(&mut self) -> Result<()> {
        let mut out = std::io::stdout();
        execute!(out, Clear(ClearType::All), Clear(ClearType::Purge), MoveTo(0, 0))?;
        out.flush()?;
        Ok(())
    }
}

/// Real process backend used in production.
#[derive(Debug, Clone)]
pub struct ProcessSpawner {
    shell: Option<String>,
    workdir: PathBuf,
    events: mpsc::UnboundedSender<RuntimeEvent>,
}

impl ProcessSpawner {
    pub fn new(
        shell: Option<String>,
        workdir: PathBuf,
        events: mpsc::UnboundedSender<RuntimeEvent>,
    ) -> Self {
        Self {
            shell,
            workdir,
            events,
        }
    }
}

impl CommandSpawner for ProcessSpawner {
    fn spawn(&mut self, command: &str) -> Result<()> {
        let mut cmd = build_command(command, self.shell.as_deref(), &self.workdir)
            .ok_or_else(|| WatchPlusError::ConfigError(format!("empty command {command:?}")))?;

        let mut child = cmd.spawn().map_err(|source| WatchPlusError::SpawnError {
            command: command.to_string(),
            source,
        })?;

        debug!(command = %command, pid = child.id(), "process started");

        let events = self.events.clone();
        let command = command.to_string();
        tokio::spawn(async move {
            let outcome = match child.wait().await {
                Ok(status) if status.success() => CommandOutcome::Success,
                Ok(status) => CommandOutcome::Failed(status.code()),
                Err(err) => {
                    error!(command = %command, error = %err, "waiting for process failed");
                    CommandOutcome::Failed(None)
                }
            };
            // Runtime gone means we are shutting down.
            let _ = events.send(RuntimeEvent::CommandExited { command, outcome });
        });

        Ok(())
    }
}
