// src/engine/runtime.rs

use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::errors::{Result, WatchPlusError};
use crate::exec::CommandSpawner;
use crate::filter::IgnoreRuleSet;
use crate::watch::source::{EventSource, SourceMessage, SubscriptionOptions, is_fatal};

use super::core::CoreRuntime;
use super::{CommandOutcome, CoreCommand, RuntimeEvent};

/// Drives the primary watch in response to incoming events, and delegates
/// process execution to a `CommandSpawner`.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// runtime semantics. This struct handles async IO: reading events from
/// channels, opening the subscription and starting commands.
pub struct Runtime<S: EventSource, E: CommandSpawner> {
    core: CoreRuntime,
    source: S,
    options: SubscriptionOptions,
    spawner: E,
    rules_rx: Option<mpsc::UnboundedReceiver<Vec<IgnoreRuleSet>>>,
    event_rx: mpsc::UnboundedReceiver<RuntimeEvent>,
    source_rx: Option<mpsc::UnboundedReceiver<SourceMessage>>,
    subscription: Option<S::Handle>,
    /// Events produced by the shell itself, handled before the next receive.
    pending: VecDeque<RuntimeEvent>,
}

impl<S: EventSource, E: CommandSpawner> fmt::Debug for Runtime<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("options", &self.options)
            .field("subscribed", &self.subscription.is_some())
            .finish_non_exhaustive()
    }
}

/// What woke the loop up.
enum Incoming {
    Event(RuntimeEvent),
    Source(SourceMessage),
    RulesClosed,
    SourceClosed,
    EventsClosed,
}

impl<S: EventSource, E: CommandSpawner> Runtime<S, E> {
    pub fn new(
        core: CoreRuntime,
        source: S,
        options: SubscriptionOptions,
        spawner: E,
        rules_rx: mpsc::UnboundedReceiver<Vec<IgnoreRuleSet>>,
        event_rx: mpsc::UnboundedReceiver<RuntimeEvent>,
    ) -> Self {
        Self {
            core,
            source,
            options,
            spawner,
            rules_rx: Some(rules_rx),
            event_rx,
            source_rx: None,
            subscription: None,
            pending: VecDeque::new(),
        }
    }

    /// Main event loop.
    ///
    /// - Consumes rule snapshots, primary watch events and runtime events.
    /// - Feeds them into the core runtime.
    /// - Executes commands returned by the core (subscribe, clear, spawn).
    ///
    /// Returns an error only for fatal watch failures.
    pub async fn run(mut self) -> Result<()> {
        info!("cargo-watch-plus runtime started");

        loop {
            let event = match self.pending.pop_front() {
                Some(event) => event,
                None => match self.next_incoming().await {
                    Incoming::Event(event) => event,
                    Incoming::Source(Ok(event)) => RuntimeEvent::Source(event),
                    Incoming::Source(Err(err)) => {
                        if is_fatal(&err) {
                            error!(error = %err, "file watch failed");
                            return Err(WatchPlusError::WatchError(err));
                        }
                        warn!(error = %err, "file watch error");
                        continue;
                    }
                    Incoming::RulesClosed => {
                        debug!("ignore rule channel closed");
                        self.rules_rx = None;
                        continue;
                    }
                    Incoming::SourceClosed => {
                        warn!("primary file watch stopped delivering events");
                        self.source_rx = None;
                        continue;
                    }
                    Incoming::EventsClosed => {
                        info!("runtime event channel closed; exiting");
                        break;
                    }
                },
            };

            let step = self.core.step(event, Instant::now());

            for command in step.commands {
                self.execute_command(command)?;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    async fn next_incoming(&mut self) -> Incoming {
        tokio::select! {
            rules = recv_or_pending(&mut self.rules_rx) => match rules {
                Some(rules) => Incoming::Event(RuntimeEvent::RulesReloaded(rules)),
                None => Incoming::RulesClosed,
            },
            message = recv_or_pending(&mut self.source_rx) => match message {
                Some(message) => Incoming::Source(message),
                None => Incoming::SourceClosed,
            },
            event = self.event_rx.recv() => match event {
                Some(event) => Incoming::Event(event),
                None => Incoming::EventsClosed,
            },
        }
    }

    /// Execute a single command from the core.
    fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::Subscribe => {
                if self.subscription.is_some() {
                    debug!("primary subscription already open");
                    return Ok(());
                }
                let (tx, rx) = mpsc::unbounded_channel();
                let handle = self.source.subscribe(&self.options, tx)?;
                self.subscription = Some(handle);
                self.source_rx = Some(rx);
            }
            CoreCommand::ClearScreen => {
                if let Err(err) = self.spawner.clear_screen() {
                    warn!(error = %err, "failed to clear the screen");
                }
            }
            CoreCommand::Spawn(command) => {
                if let Err(err) = self.spawner.spawn(&command) {
                    error!(command = %command, error = %err, "failed to start command");
                    self.pending.push_back(RuntimeEvent::CommandExited {
                        command,
                        outcome: CommandOutcome::SpawnFailed(err.to_string()),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Receive from an optional channel; never resolves when there is none.
async fn recv_or_pending<T>(rx: &mut Option<mpsc::UnboundedReceiver<T>>) -> Option<T> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
