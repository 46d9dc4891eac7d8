// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - opening the primary subscription
//! - starting processes and clearing the screen
//! - handling Ctrl+C / shutdown
//!
//! Time is passed in explicitly, so the core is unit tested without any
//! Tokio, channels, filesystem, or processes.

use std::time::Instant;

use tracing::debug;

use crate::config::WatchConfig;
use crate::engine::{CommandName, RuntimeEvent};
use crate::exec::supervisor::{CommandSupervisor, SupervisorAction};
use crate::watch::primary::PrimaryWatcher;

/// Effect requested by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Open the primary subscription. Issued at most once.
    Subscribe,
    ClearScreen,
    Spawn(CommandName),
}

/// Result of processing a single event in the core runtime.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    pub keep_running: bool,
}

impl CoreStep {
    fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Pure core runtime state.
///
/// This owns:
/// - the primary watcher state (rule sets, readiness, debounce)
/// - the command supervisor (running set)
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreRuntime {
    primary: PrimaryWatcher,
    supervisor: CommandSupervisor,
}

impl CoreRuntime {
    pub fn new(config: &WatchConfig) -> Self {
        Self {
            primary: PrimaryWatcher::new(config.delay, config.postpone),
            supervisor: CommandSupervisor::new(
                config.commands.clone(),
                config.overlap,
                config.trigger,
                config.clear,
            ),
        }
    }

    pub fn primary(&self) -> &PrimaryWatcher {
        &self.primary
    }

    pub fn supervisor(&self) -> &CommandSupervisor {
        &self.supervisor
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent, now: Instant) -> CoreStep {
        match event {
            RuntimeEvent::RulesReloaded(rule_sets) => {
                let commands = if self.primary.start(rule_sets) {
                    vec![CoreCommand::Subscribe]
                } else {
                    Vec::new()
                };
                CoreStep::running(commands)
            }
            RuntimeEvent::Source(event) => {
                let Some(debounce) = self.primary.on_event(&event, now) else {
                    return CoreStep::running(Vec::new());
                };
                let commands = self
                    .supervisor
                    .run_commands(debounce)
                    .into_iter()
                    .map(|action| match action {
                        SupervisorAction::ClearScreen => CoreCommand::ClearScreen,
                        SupervisorAction::Spawn(command) => CoreCommand::Spawn(command),
                    })
                    .collect();
                CoreStep::running(commands)
            }
            RuntimeEvent::CommandExited { command, outcome } => {
                self.supervisor.finished(&command, &outcome);
                CoreStep::running(Vec::new())
            }
            RuntimeEvent::ShutdownRequested => {
                debug!("shutdown requested");
                CoreStep {
                    commands: Vec::new(),
                    keep_running: false,
                }
            }
        }
    }
}
