// src/filter/rules.rs

use std::fmt;
use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::warn;

use crate::errors::Result;
use crate::watch::path_utils::relative_to;

/// Version-control directory excluded by the built-in rule set.
pub const VCS_DIR: &str = ".git";
/// Build-output directory excluded by the built-in rule set.
pub const BUILD_DIR: &str = "target";

/// Where the patterns of an [`IgnoreRuleSet`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    /// An ignore-definition file on disk.
    File(PathBuf),
    /// The synthetic rule set covering `.git`, `target` and `--ignore`
    /// patterns.
    BuiltIn,
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSource::File(path) => write!(f, "{}", path.display()),
            RuleSource::BuiltIn => f.write_str("default"),
        }
    }
}

/// Compiled gitignore-style patterns rooted at a base directory.
///
/// Immutable once built. A reload builds fresh rule sets and replaces the
/// whole list.
#[derive(Clone)]
pub struct IgnoreRuleSet {
    source: RuleSource,
    base_dir: PathBuf,
    patterns: Vec<String>,
    matcher: Gitignore,
}

impl fmt::Debug for IgnoreRuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgnoreRuleSet")
            .field("source", &self.source)
            .field("base_dir", &self.base_dir)
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl IgnoreRuleSet {
    /// Compile `patterns` rooted at `base_dir`.
    ///
    /// Every string is a pattern, including ones starting with `#`: those are
    /// re-escaped so the gitignore engine does not read them as comments.
    /// Patterns the engine rejects are skipped with a warning.
    pub fn new(
        source: RuleSource,
        base_dir: impl Into<PathBuf>,
        patterns: Vec<String>,
    ) -> Result<Self> {
        let base_dir = base_dir.into();
        let mut builder = GitignoreBuilder::new(&base_dir);
        for pattern in &patterns {
            let line = if pattern.starts_with('#') {
                format!("\\{pattern}")
            } else {
                pattern.clone()
            };
            if let Err(err) = builder.add_line(None, &line) {
                warn!(
                    source = %source,
                    pattern = %pattern,
                    error = %err,
                    "skipping invalid ignore pattern"
                );
            }
        }
        let matcher = builder.build()?;

        Ok(Self {
            source,
            base_dir,
            patterns,
            matcher,
        })
    }

    /// The synthetic rule set: `.git`, `target`, then any user patterns.
    pub fn built_in(watch_root: impl Into<PathBuf>, extra: &[String]) -> Result<Self> {
        let mut patterns = vec![VCS_DIR.to_string(), BUILD_DIR.to_string()];
        patterns.extend(extra.iter().cloned());
        Self::new(RuleSource::BuiltIn, watch_root, patterns)
    }

    pub fn source(&self) -> &RuleSource {
        &self.source
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Test a path already made relative to [`base_dir`](Self::base_dir).
    ///
    /// A path counts as ignored when it or any of its parent directories
    /// matches.
    pub fn ignores(&self, rel_path: &Path, is_dir: bool) -> bool {
        if rel_path.as_os_str().is_empty() {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(rel_path, is_dir)
            .is_ignore()
    }

    /// Test an absolute path. Returns `None` when the path lies outside
    /// `base_dir`; such a rule set is never consulted.
    pub fn check(&self, path: &Path, is_dir: bool) -> Option<bool> {
        let rel = relative_to(&self.base_dir, path)?;
        Some(self.ignores(&rel, is_dir))
    }
}

/// Return the first rule set, in order, that ignores `path`.
pub fn first_ignoring<'a>(
    rule_sets: &'a [IgnoreRuleSet],
    path: &Path,
    is_dir: bool,
) -> Option<&'a IgnoreRuleSet> {
    rule_sets
        .iter()
        .find(|set| set.check(path, is_dir).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn file_set(file: &str, list: &[&str]) -> IgnoreRuleSet {
        let file = PathBuf::from(file);
        let base = file.parent().unwrap().to_path_buf();
        IgnoreRuleSet::new(RuleSource::File(file), base, patterns(list)).unwrap()
    }

    #[test]
    fn directory_pattern_ignores_nested_files() {
        let set = file_set("/p/.gitignore", &["target"]);
        assert!(set.ignores(Path::new("target/foo.rs"), false));
        assert!(set.ignores(Path::new("target"), true));
        assert!(!set.ignores(Path::new("src/main.rs"), false));
    }

    #[test]
    fn hash_prefixed_pattern_is_literal() {
        let set = file_set("/p/.gitignore", &["#literal"]);
        assert!(set.ignores(Path::new("#literal"), false));
        assert!(!set.ignores(Path::new("literal"), false));
    }

    #[test]
    fn negation_whitelists() {
        let set = file_set("/p/.gitignore", &["*.log", "!keep.log"]);
        assert!(set.ignores(Path::new("debug.log"), false));
        assert!(!set.ignores(Path::new("keep.log"), false));
    }

    #[test]
    fn paths_outside_base_dir_are_not_consulted() {
        // Would match everything if it were consulted.
        let set = file_set("/p/sub/.gitignore", &["*"]);
        assert_eq!(set.check(Path::new("/p/other/file.rs"), false), None);
        assert_eq!(set.check(Path::new("/p/file.rs"), false), None);
        assert_eq!(set.check(Path::new("/p/sub/file.rs"), false), Some(true));
        assert!(first_ignoring(&[set], Path::new("/p/file.rs"), false).is_none());
    }

    #[test]
    fn first_match_wins_in_push_order() {
        let sets = vec![
            file_set("/p/.gitignore", &["*.rs"]),
            file_set("/p/.ignore", &["*.rs"]),
            IgnoreRuleSet::built_in("/p", &patterns(&["*.rs"])).unwrap(),
        ];

        let hit = first_ignoring(&sets, Path::new("/p/src/lib.rs"), false).unwrap();
        assert_eq!(hit.source(), &RuleSource::File(PathBuf::from("/p/.gitignore")));

        let only_builtin = first_ignoring(&sets, Path::new("/p/target/debug/x"), false).unwrap();
        assert_eq!(only_builtin.source(), &RuleSource::BuiltIn);
    }

    #[test]
    fn built_in_covers_vcs_build_and_extra() {
        let set = IgnoreRuleSet::built_in("/p", &patterns(&["*.swp"])).unwrap();
        assert_eq!(set.patterns(), patterns(&[".git", "target", "*.swp"]).as_slice());
        assert!(set.ignores(Path::new(".git/HEAD"), false));
        assert!(set.ignores(Path::new("crates/a/target/debug/a"), false));
        assert!(set.ignores(Path::new("src/.main.rs.swp"), false));
        assert!(!set.ignores(Path::new("src/main.rs"), false));
    }

    #[test]
    fn empty_relative_path_is_never_ignored() {
        let set = file_set("/p/.gitignore", &["*"]);
        assert_eq!(set.check(Path::new("/p"), true), Some(false));
    }
}
