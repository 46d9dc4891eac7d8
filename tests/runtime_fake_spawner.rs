// tests/runtime_fake_spawner.rs

use cargo_watch_plus_test_utils::builders::WatchConfigBuilder;
use cargo_watch_plus_test_utils::fake_source::{ManualSource, ManualSourceHandle};
use cargo_watch_plus_test_utils::fake_spawner::{FakeSpawner, Spawned, finish};
use cargo_watch_plus_test_utils::{init_tracing, recv_within, with_timeout};

use std::error::Error;
use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use cargo_watch_plus::config::WatchConfig;
use cargo_watch_plus::engine::{CommandOutcome, CoreRuntime, Runtime, RuntimeEvent};
use cargo_watch_plus::errors::WatchPlusError;
use cargo_watch_plus::filter::{IgnoreRuleSet, RuleSource};
use cargo_watch_plus::watch::{SubscriptionOptions, WatchEvent};

type TestResult = Result<(), Box<dyn Error>>;

/// A running runtime plus every handle a test needs to drive it.
struct Harness {
    rules_tx: mpsc::UnboundedSender<Vec<IgnoreRuleSet>>,
    rt_tx: mpsc::UnboundedSender<RuntimeEvent>,
    source: ManualSourceHandle,
    spawned: mpsc::UnboundedReceiver<Spawned>,
    task: JoinHandle<cargo_watch_plus::errors::Result<()>>,
}

impl Harness {
    fn start(
        config: WatchConfig,
        spawner: FakeSpawner,
        spawned: mpsc::UnboundedReceiver<Spawned>,
    ) -> Self {
        Self::start_with(config, spawner, spawned, mpsc::unbounded_channel())
    }

    fn start_with(
        config: WatchConfig,
        spawner: FakeSpawner,
        spawned: mpsc::UnboundedReceiver<Spawned>,
        (rt_tx, rt_rx): (
            mpsc::UnboundedSender<RuntimeEvent>,
            mpsc::UnboundedReceiver<RuntimeEvent>,
        ),
    ) -> Self {
        let (rules_tx, rules_rx) = mpsc::unbounded_channel();
        let (source, handle) = ManualSource::new();
        let options = SubscriptionOptions {
            root: config.watch_root.clone(),
            poll: false,
            discover: Vec::new(),
        };
        let core = CoreRuntime::new(&config);
        let runtime = Runtime::new(core, source, options, spawner, rules_rx, rt_rx);
        let task = tokio::spawn(runtime.run());

        Self {
            rules_tx,
            rt_tx,
            source: handle,
            spawned,
            task,
        }
    }

    /// Push rules, wait for the subscription and complete the initial scan.
    async fn make_ready(&mut self, rules: Vec<IgnoreRuleSet>) {
        self.rules_tx.send(rules).unwrap();
        with_timeout(self.source.wait_for_subscriptions(1)).await;
        assert!(self.source.send(0, WatchEvent::InitialScanComplete));
    }

    fn change(&self, path: &str) {
        assert!(self.source.send(0, WatchEvent::Changed(PathBuf::from(path))));
    }

    async fn next(&mut self) -> Option<Spawned> {
        recv_within(&mut self.spawned, 500).await
    }

    /// Give the runtime a moment to drain what was just sent, so events on
    /// different channels are handled in the order the test sent them.
    async fn settle(&self) {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    async fn quiet(&mut self) -> bool {
        recv_within(&mut self.spawned, 150).await.is_none()
    }

    async fn shutdown(self) -> cargo_watch_plus::errors::Result<()> {
        let _ = self.rt_tx.send(RuntimeEvent::ShutdownRequested);
        with_timeout(self.task).await.unwrap()
    }
}

fn rules(root: &str) -> Vec<IgnoreRuleSet> {
    vec![
        IgnoreRuleSet::new(
            RuleSource::File(PathBuf::from(format!("{root}/.gitignore"))),
            root,
            vec!["*.log".to_string()],
        )
        .unwrap(),
        IgnoreRuleSet::built_in(root, &[]).unwrap(),
    ]
}

fn cmd(c: &str) -> Option<Spawned> {
    Some(Spawned::Command(c.to_string()))
}

#[tokio::test]
async fn initial_run_happens_once_the_watch_is_ready() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::unbounded_channel();
    let (spawner, spawned) = FakeSpawner::new();
    let spawner = spawner.completing(rt_tx.clone());
    let config = WatchConfigBuilder::new("/proj").build();
    let mut h = Harness::start_with(config, spawner, spawned, (rt_tx, rt_rx));

    h.rules_tx.send(rules("/proj"))?;
    with_timeout(h.source.wait_for_subscriptions(1)).await;

    // Population events before readiness never run anything.
    assert!(h.source.send(0, WatchEvent::Added("/proj/src/lib.rs".into())));
    assert!(h.quiet().await);

    assert!(h.source.send(0, WatchEvent::InitialScanComplete));
    assert_eq!(h.next().await, cmd("cargo check"));
    assert!(h.quiet().await);

    let options = h.source.options(0).unwrap();
    assert_eq!(options.root, PathBuf::from("/proj"));
    assert!(options.discover.is_empty());

    h.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn ignored_changes_do_not_trigger() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::unbounded_channel();
    let (spawner, spawned) = FakeSpawner::new();
    let spawner = spawner.completing(rt_tx.clone());
    let config = WatchConfigBuilder::new("/proj").postpone().build();
    let mut h = Harness::start_with(config, spawner, spawned, (rt_tx, rt_rx));

    h.make_ready(rules("/proj")).await;
    assert!(h.quiet().await, "postponed first run must not spawn");

    h.change("/proj/debug.log");
    h.change("/proj/target/debug/app");
    h.change("/proj/.git/index");
    assert!(h.quiet().await);

    h.change("/proj/src/main.rs");
    assert_eq!(h.next().await, cmd("cargo check"));

    h.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn rule_updates_swap_rules_without_resubscribing() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::unbounded_channel();
    let (spawner, spawned) = FakeSpawner::new();
    let spawner = spawner.completing(rt_tx.clone());
    let config = WatchConfigBuilder::new("/proj").postpone().build();
    let mut h = Harness::start_with(config, spawner, spawned, (rt_tx, rt_rx));

    h.make_ready(rules("/proj")).await;
    h.change("/proj/trace.log");
    assert!(h.quiet().await);

    // The .gitignore went away: only the built-in set is left.
    h.rules_tx
        .send(vec![IgnoreRuleSet::built_in("/proj", &[]).unwrap()])?;
    assert!(h.quiet().await);
    h.change("/proj/trace.log");
    assert_eq!(h.next().await, cmd("cargo check"));

    assert_eq!(h.source.subscriptions(), 1);
    h.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn no_restart_skips_the_running_command() -> TestResult {
    init_tracing();

    let (spawner, spawned) = FakeSpawner::new();
    let config = WatchConfigBuilder::new("/proj")
        .commands(&["cargo build", "cargo test"])
        .no_restart()
        .build();
    let mut h = Harness::start(config, spawner, spawned);

    h.make_ready(rules("/proj")).await;
    assert_eq!(h.next().await, cmd("cargo build"));
    assert_eq!(h.next().await, cmd("cargo test"));

    finish(&h.rt_tx, "cargo test", CommandOutcome::Failed(Some(101)));
    h.settle().await;
    h.change("/proj/src/lib.rs");
    assert_eq!(h.next().await, cmd("cargo test"));
    assert!(h.quiet().await);

    h.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn when_idle_waits_for_every_command() -> TestResult {
    init_tracing();

    let (spawner, spawned) = FakeSpawner::new();
    let config = WatchConfigBuilder::new("/proj")
        .commands(&["cargo build", "echo done"])
        .when_idle()
        .clear()
        .build();
    let mut h = Harness::start(config, spawner, spawned);

    h.make_ready(rules("/proj")).await;
    assert_eq!(h.next().await, Some(Spawned::Clear));
    assert_eq!(h.next().await, cmd("cargo build"));
    assert_eq!(h.next().await, cmd("echo done"));

    finish(&h.rt_tx, "echo done", CommandOutcome::Success);
    h.settle().await;
    h.change("/proj/src/lib.rs");
    assert!(h.quiet().await, "one command still running");

    finish(&h.rt_tx, "cargo build", CommandOutcome::Success);
    h.settle().await;
    h.change("/proj/src/lib.rs");
    assert_eq!(h.next().await, Some(Spawned::Clear));
    assert_eq!(h.next().await, cmd("cargo build"));
    assert_eq!(h.next().await, cmd("echo done"));

    h.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn failed_spawn_releases_the_command() -> TestResult {
    init_tracing();

    let (spawner, spawned) = FakeSpawner::new();
    let spawner = spawner.failing("cargo nope");
    let config = WatchConfigBuilder::new("/proj")
        .commands(&["cargo nope"])
        .when_idle()
        .no_restart()
        .build();
    let mut h = Harness::start(config, spawner, spawned);

    h.make_ready(rules("/proj")).await;
    assert_eq!(h.next().await, Some(Spawned::Refused("cargo nope".into())));

    // Not counted as running, so neither policy blocks the next attempt.
    h.change("/proj/src/lib.rs");
    assert_eq!(h.next().await, Some(Spawned::Refused("cargo nope".into())));

    h.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn debounce_window_blocks_rapid_triggers() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::unbounded_channel();
    let (spawner, spawned) = FakeSpawner::new();
    let spawner = spawner.completing(rt_tx.clone());
    let config = WatchConfigBuilder::new("/proj").delay_ms(60_000).build();
    let mut h = Harness::start_with(config, spawner, spawned, (rt_tx, rt_rx));

    h.make_ready(rules("/proj")).await;
    assert_eq!(h.next().await, cmd("cargo check"));

    h.change("/proj/src/a.rs");
    h.change("/proj/src/b.rs");
    assert!(h.quiet().await);

    h.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn non_fatal_watch_errors_are_survived() -> TestResult {
    init_tracing();

    let (rt_tx, rt_rx) = mpsc::unbounded_channel();
    let (spawner, spawned) = FakeSpawner::new();
    let spawner = spawner.completing(rt_tx.clone());
    let config = WatchConfigBuilder::new("/proj").postpone().build();
    let mut h = Harness::start_with(config, spawner, spawned, (rt_tx, rt_rx));

    h.make_ready(rules("/proj")).await;
    assert!(h.source.send_message(0, Err(notify::Error::generic("transient"))));
    h.settle().await;
    h.change("/proj/src/lib.rs");
    assert_eq!(h.next().await, cmd("cargo check"));

    h.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn exhausted_watch_limit_is_fatal() -> TestResult {
    init_tracing();

    let (spawner, spawned) = FakeSpawner::new();
    let config = WatchConfigBuilder::new("/proj").postpone().build();
    let mut h = Harness::start(config, spawner, spawned);

    h.make_ready(rules("/proj")).await;
    assert!(h.source.send_message(
        0,
        Err(notify::Error::new(notify::ErrorKind::MaxFilesWatch))
    ));

    let result = with_timeout(h.task).await?;
    assert!(matches!(result, Err(WatchPlusError::WatchError(_))));
    Ok(())
}
