use std::collections::HashSet;
use std::io;

use tokio::sync::mpsc;

use cargo_watch_plus::engine::{CommandOutcome, RuntimeEvent};
use cargo_watch_plus::errors::{Result, WatchPlusError};
use cargo_watch_plus::exec::CommandSpawner;

/// What the fake spawner was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Spawned {
    Clear,
    Command(String),
    /// A start attempt the fake refused.
    Refused(String),
}

/// A fake spawner that:
/// - reports every clear and spawn on a channel the test reads from
/// - either leaves commands "running" until the test reports their exit, or
///   (with [`completing`](Self::completing)) finishes them immediately
/// - refuses to start commands marked with [`failing`](Self::failing).
pub struct FakeSpawner {
    log: mpsc::UnboundedSender<Spawned>,
    runtime_tx: Option<mpsc::UnboundedSender<RuntimeEvent>>,
    failing: HashSet<String>,
}

impl FakeSpawner {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Spawned>) {
        let (log, rx) = mpsc::unbounded_channel();
        let spawner = Self {
            log,
            runtime_tx: None,
            failing: HashSet::new(),
        };
        (spawner, rx)
    }

    /// Report `Success` for every command right after starting it.
    pub fn completing(mut self, runtime_tx: mpsc::UnboundedSender<RuntimeEvent>) -> Self {
        self.runtime_tx = Some(runtime_tx);
        self
    }

    pub fn failing(mut self, command: &str) -> Self {
        self.failing.insert(command.to_string());
        self
    }
}

impl CommandSpawner for FakeSpawner {
    fn spawn(&mut self, command: &str) -> Result<()> {
        if self.failing.contains(command) {
            let _ = self.log.send(Spawned::Refused(command.to_string()));
            return Err(WatchPlusError::SpawnError {
                command: command.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such program"),
            });
        }

        let _ = self.log.send(Spawned::Command(command.to_string()));

        if let Some(tx) = &self.runtime_tx {
            let _ = tx.send(RuntimeEvent::CommandExited {
                command: command.to_string(),
                outcome: CommandOutcome::Success,
            });
        }
        Ok(())
    }

    fn clear_screen(&mut self) -> Result<()> {
        let _ = self.log.send(Spawned::Clear);
        Ok(())
    }
}

/// Report that `command` exited with `outcome`.
pub fn finish(
    runtime_tx: &mpsc::UnboundedSender<RuntimeEvent>,
    command: &str,
    outcome: CommandOutcome,
) {
    let _ = runtime_tx.send(RuntimeEvent::CommandExited {
        command: command.to_string(),
        outcome,
    });
}
