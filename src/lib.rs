// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod filter;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{WatchConfig, load_config};
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent};
use crate::errors::{Result, WatchPlusError};
use crate::exec::ProcessSpawner;
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::{NotifySource, SubscriptionOptions, spawn_ignore_file_watcher};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and the switch to the working directory
/// - the ignore-file watcher task
/// - the primary runtime with the process spawner
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let cwd = std::env::current_dir()?;
    let config = load_config(args, &cwd, fs.as_ref())?;

    std::env::set_current_dir(&config.workdir)?;
    debug!(?config, "configuration resolved");
    info!(
        root = %config.watch_root.display(),
        commands = ?config.commands,
        "watching for changes"
    );

    watch(config, fs).await
}

/// Run the watchers and the runtime until Ctrl-C or a fatal watch error.
pub async fn watch(config: WatchConfig, fs: Arc<dyn FileSystem>) -> Result<()> {
    let (rules_tx, rules_rx) = mpsc::unbounded_channel();
    let (rt_tx, rt_rx) = mpsc::unbounded_channel::<RuntimeEvent>();

    let ignore_task = spawn_ignore_file_watcher(
        &config,
        NotifySource::new(Arc::clone(&fs)),
        Arc::clone(&fs),
        rules_tx,
    )?;

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested);
        });
    }

    let options = SubscriptionOptions {
        root: config.watch_root.clone(),
        poll: config.poll,
        discover: Vec::new(),
    };
    let spawner = ProcessSpawner::new(config.shell.clone(), config.workdir.clone(), rt_tx);

    // Construct the pure core runtime (single source of truth for semantics).
    let core = CoreRuntime::new(&config);

    // Construct the async IO shell around the core.
    let runtime = Runtime::new(core, NotifySource::new(fs), options, spawner, rules_rx, rt_rx);
    let runtime = runtime.run();
    tokio::pin!(runtime);

    tokio::select! {
        res = &mut runtime => return res,
        joined = ignore_task => match joined {
            Ok(Ok(())) => debug!("ignore file watcher finished"),
            Ok(Err(err)) => return Err(err),
            Err(err) => return Err(WatchPlusError::Other(err.into())),
        },
    }

    runtime.await
}
