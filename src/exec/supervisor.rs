// src/exec/supervisor.rs

//! Command supervision: which commands are running and which may start.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::engine::{CommandName, CommandOutcome};
use crate::types::{OverlapPolicy, TriggerPolicy};
use crate::watch::debounce::{Debounce, round_secs};

/// Effect requested by the supervisor; performed by the runtime shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorAction {
    ClearScreen,
    Spawn(CommandName),
}

/// Owns the set of running commands and the overlap / idle policies.
///
/// Commands are added when their spawn is requested and removed when their
/// exit (or spawn failure) is reported through [`finished`](Self::finished).
#[derive(Debug, Clone)]
pub struct CommandSupervisor {
    commands: Vec<CommandName>,
    overlap: OverlapPolicy,
    trigger: TriggerPolicy,
    clear: bool,
    running: HashSet<CommandName>,
}

impl CommandSupervisor {
    pub fn new(
        commands: Vec<CommandName>,
        overlap: OverlapPolicy,
        trigger: TriggerPolicy,
        clear: bool,
    ) -> Self {
        Self {
            commands,
            overlap,
            trigger,
            clear,
            running: HashSet::new(),
        }
    }

    pub fn commands(&self) -> &[CommandName] {
        &self.commands
    }

    pub fn is_running(&self, command: &str) -> bool {
        self.running.contains(command)
    }

    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    /// Decide what to run for one trigger.
    ///
    /// `debounce` is the result of the trigger attempt that led here. The
    /// idle check comes first, then the debounce check; either skips the
    /// whole batch.
    pub fn run_commands(&mut self, debounce: Debounce) -> Vec<SupervisorAction> {
        if self.trigger == TriggerPolicy::WhenIdle && !self.running.is_empty() {
            debug!(
                running = self.running.len(),
                "Skipping update. There are {} running commands.",
                self.running.len()
            );
            return Vec::new();
        }

        if let Debounce::TooSoon { elapsed } = debounce {
            debug!("Skipping update. Last update was {}s ago.", round_secs(elapsed));
            return Vec::new();
        }

        let mut actions = Vec::with_capacity(self.commands.len() + 1);
        if self.clear {
            actions.push(SupervisorAction::ClearScreen);
        }

        for command in &self.commands {
            if self.overlap == OverlapPolicy::NoRestart && self.running.contains(command) {
                debug!(command = %command, "Command is already running, skipping re-run.");
                continue;
            }
            debug!(command = %command, "Running command.");
            self.running.insert(command.clone());
            actions.push(SupervisorAction::Spawn(command.clone()));
        }

        actions
    }

    /// Record the end of `command`, whatever the outcome.
    pub fn finished(&mut self, command: &str, outcome: &CommandOutcome) {
        if !self.running.remove(command) {
            debug!(command = %command, "exit reported for a command that was not tracked");
        }

        match outcome {
            CommandOutcome::Success => {
                info!(command = %command, "command finished");
            }
            CommandOutcome::Failed(Some(code)) => {
                warn!(command = %command, exit_code = code, "command failed");
            }
            CommandOutcome::Failed(None) => {
                warn!(command = %command, "command terminated by signal");
            }
            CommandOutcome::SpawnFailed(reason) => {
                warn!(command = %command, %reason, "command could not be started");
            }
        }
    }
}
