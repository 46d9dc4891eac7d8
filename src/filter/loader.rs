// src/filter/loader.rs

//! Reading ignore-definition files into [`IgnoreRuleSet`]s.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::{Result, WatchPlusError};
use crate::filter::rules::{IgnoreRuleSet, RuleSource};
use crate::fs::FileSystem;

/// Extract the patterns of an ignore file.
///
/// Lines are trimmed; blank lines and `#` comments are dropped; a leading
/// `\#` is unescaped to a literal `#`.
pub fn parse_patterns(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| match line.strip_prefix("\\#") {
            Some(rest) => format!("#{rest}"),
            None => line.to_string(),
        })
        .collect()
}

/// Load one ignore file, rooting its patterns at the file's directory.
pub fn load_rule_set(fs: &dyn FileSystem, path: &Path) -> Result<IgnoreRuleSet> {
    let content = fs
        .read_to_string(path)
        .map_err(|err| WatchPlusError::IgnoreFileRead {
            path: path.to_path_buf(),
            reason: format!("{err:#}"),
        })?;

    let patterns = parse_patterns(&content);
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    debug!(file = ?path, count = patterns.len(), "loaded ignore patterns");
    IgnoreRuleSet::new(RuleSource::File(path.to_path_buf()), base_dir, patterns)
}

/// Load every file in order, skipping (and logging) the ones that fail.
pub fn load_rule_sets(fs: &dyn FileSystem, files: &[PathBuf]) -> Vec<IgnoreRuleSet> {
    files
        .iter()
        .filter_map(|file| match load_rule_set(fs, file) {
            Ok(set) => Some(set),
            Err(err) => {
                warn!(error = %err, "skipping ignore file for this reload");
                None
            }
        })
        .collect()
}
