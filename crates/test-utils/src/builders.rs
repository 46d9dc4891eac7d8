#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use cargo_watch_plus::config::{DOT_IGNORE, GIT_IGNORE, WatchConfig};
use cargo_watch_plus::types::{OverlapPolicy, TriggerPolicy};

/// Builder for `WatchConfig` to simplify test setup.
///
/// Defaults mirror a plain `cargo watch-plus` run rooted at `root`, except
/// for the delay, which is zero so tests do not depend on wall-clock time.
pub struct WatchConfigBuilder {
    config: WatchConfig,
}

impl WatchConfigBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            config: WatchConfig {
                watch_root: root.clone(),
                delay: Duration::ZERO,
                ignore_nothing: false,
                extra_ignores: Vec::new(),
                ignore_files: vec![GIT_IGNORE.to_string(), DOT_IGNORE.to_string()],
                overlap: OverlapPolicy::Allow,
                trigger: TriggerPolicy::Always,
                commands: vec!["cargo check".to_string()],
                clear: false,
                postpone: false,
                poll: false,
                workdir: root,
                shell: None,
            },
        }
    }

    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.config.delay = Duration::from_millis(ms);
        self
    }

    pub fn commands(mut self, commands: &[&str]) -> Self {
        self.config.commands = commands.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn ignore(mut self, pattern: &str) -> Self {
        self.config.extra_ignores.push(pattern.to_string());
        self
    }

    pub fn ignore_nothing(mut self) -> Self {
        self.config.ignore_nothing = true;
        self
    }

    pub fn ignore_files(mut self, names: &[&str]) -> Self {
        self.config.ignore_files = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn no_restart(mut self) -> Self {
        self.config.overlap = OverlapPolicy::NoRestart;
        self
    }

    pub fn when_idle(mut self) -> Self {
        self.config.trigger = TriggerPolicy::WhenIdle;
        self
    }

    pub fn clear(mut self) -> Self {
        self.config.clear = true;
        self
    }

    pub fn postpone(mut self) -> Self {
        self.config.postpone = true;
        self
    }

    pub fn build(self) -> WatchConfig {
        self.config
    }
}
