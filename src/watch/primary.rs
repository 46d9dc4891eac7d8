// src/watch/primary.rs

//! State of the primary watch: current rule sets, readiness and debounce.
//!
//! Pure and synchronous. The subscription itself lives in the runtime
//! shell; this type only decides *when* one must be opened.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::filter::{IgnoreRuleSet, first_ignoring};
use crate::logging::WHY;
use crate::watch::debounce::{Debounce, Debouncer};
use crate::watch::source::WatchEvent;

#[derive(Debug, Clone)]
pub struct PrimaryWatcher {
    rule_sets: Vec<IgnoreRuleSet>,
    ready: bool,
    subscribed: bool,
    postpone: bool,
    debouncer: Debouncer,
}

impl PrimaryWatcher {
    pub fn new(delay: Duration, postpone: bool) -> Self {
        Self {
            rule_sets: Vec::new(),
            ready: false,
            subscribed: false,
            postpone,
            debouncer: Debouncer::new(delay),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn rule_sets(&self) -> &[IgnoreRuleSet] {
        &self.rule_sets
    }

    /// Install a fresh rule set snapshot.
    ///
    /// Returns `true` exactly once: on the first snapshot, when the caller
    /// must open the subscription. Later snapshots only swap the rules.
    pub fn start(&mut self, rule_sets: Vec<IgnoreRuleSet>) -> bool {
        debug!(count = rule_sets.len(), "ignore rules updated");
        self.rule_sets = rule_sets;
        if self.subscribed {
            return false;
        }
        self.subscribed = true;
        true
    }

    /// Which rule set, if any, ignores `path`.
    pub fn ignored_by(&self, path: &Path, is_dir: bool) -> Option<&IgnoreRuleSet> {
        first_ignoring(&self.rule_sets, path, is_dir)
    }

    /// Handle one notification.
    ///
    /// Returns the debounce result when the event counts as a trigger
    /// attempt, `None` when it is dropped (not ready yet, ignored, or a
    /// postponed first run).
    pub fn on_event(&mut self, event: &WatchEvent, now: Instant) -> Option<Debounce> {
        let (kind, path) = match (event.kind(), event.path()) {
            (Some(kind), Some(path)) => (kind, path),
            _ => return self.on_ready(now),
        };

        if !self.ready {
            debug!("[{kind}] INIT {}", path.display());
            return None;
        }

        if let Some(set) = self.ignored_by(path, path.is_dir()) {
            info!(target: WHY, "[{kind}] IGNORED ({}) {}", set.source(), path.display());
            return None;
        }

        info!(target: WHY, "[{kind}] {}", path.display());
        Some(self.debouncer.attempt(now))
    }

    fn on_ready(&mut self, now: Instant) -> Option<Debounce> {
        if self.ready {
            debug!("duplicate initial scan notification");
            return None;
        }
        self.ready = true;
        info!("File watch is ready.");

        if self.postpone {
            info!("Postponing initial run.");
            return None;
        }
        Some(self.debouncer.attempt(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::filter::{IgnoreRuleSet, RuleSource};

    fn rules() -> Vec<IgnoreRuleSet> {
        vec![
            IgnoreRuleSet::new(
                RuleSource::File(PathBuf::from("/proj/.gitignore")),
                "/proj",
                vec!["*.log".to_string()],
            )
            .unwrap(),
            IgnoreRuleSet::built_in("/proj", &[]).unwrap(),
        ]
    }

    fn ready_watcher(now: Instant) -> PrimaryWatcher {
        let mut w = PrimaryWatcher::new(Duration::from_millis(500), false);
        w.start(rules());
        assert_eq!(
            w.on_event(&WatchEvent::InitialScanComplete, now),
            Some(Debounce::Admitted)
        );
        w
    }

    #[test]
    fn subscribes_only_on_first_snapshot() {
        let mut w = PrimaryWatcher::new(Duration::ZERO, false);
        assert!(w.start(rules()));
        assert!(!w.start(Vec::new()));
        assert!(w.rule_sets().is_empty());
        assert!(w.is_subscribed());
    }

    #[test]
    fn events_before_ready_never_trigger() {
        let mut w = PrimaryWatcher::new(Duration::ZERO, false);
        w.start(rules());
        let now = Instant::now();
        assert_eq!(w.on_event(&WatchEvent::Added("/proj/src/lib.rs".into()), now), None);
        assert!(!w.is_ready());
    }

    #[test]
    fn postpone_skips_the_initial_run() {
        let mut w = PrimaryWatcher::new(Duration::ZERO, true);
        w.start(rules());
        assert_eq!(w.on_event(&WatchEvent::InitialScanComplete, Instant::now()), None);
        assert!(w.is_ready());
    }

    #[test]
    fn second_scan_complete_is_ignored() {
        let now = Instant::now();
        let mut w = ready_watcher(now);
        assert_eq!(
            w.on_event(&WatchEvent::InitialScanComplete, now + Duration::from_secs(5)),
            None
        );
    }

    #[test]
    fn ignored_paths_do_not_attempt() {
        let t0 = Instant::now();
        let mut w = ready_watcher(t0);
        let later = t0 + Duration::from_secs(1);
        assert_eq!(w.on_event(&WatchEvent::Changed("/proj/out.log".into()), later), None);
        assert_eq!(w.on_event(&WatchEvent::Changed("/proj/target/a.rs".into()), later), None);
        // The ignored events above did not move the debounce window.
        assert_eq!(
            w.on_event(&WatchEvent::Changed("/proj/src/main.rs".into()), later),
            Some(Debounce::Admitted)
        );
    }

    #[test]
    fn first_matching_set_is_reported() {
        let w = ready_watcher(Instant::now());
        let set = w.ignored_by(Path::new("/proj/x.log"), false).unwrap();
        assert_eq!(set.source(), &RuleSource::File(PathBuf::from("/proj/.gitignore")));
        let set = w.ignored_by(Path::new("/proj/.git/HEAD"), false).unwrap();
        assert_eq!(set.source(), &RuleSource::BuiltIn);
    }

    #[test]
    fn paths_outside_every_base_are_not_ignored() {
        let w = ready_watcher(Instant::now());
        assert!(w.ignored_by(Path::new("/elsewhere/target/x"), false).is_none());
    }
}
