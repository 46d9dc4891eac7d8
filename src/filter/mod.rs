// src/filter/mod.rs

//! Ignore rules.
//!
//! - [`rules`] holds the compiled, immutable [`IgnoreRuleSet`] and the
//!   first-match lookup over an ordered list of them.
//! - [`loader`] turns ignore-definition files into rule sets.
//!
//! Pattern syntax is delegated to the `ignore` crate's gitignore engine.

pub mod loader;
pub mod rules;

pub use loader::{load_rule_set, load_rule_sets, parse_patterns};
pub use rules::{BUILD_DIR, IgnoreRuleSet, RuleSource, VCS_DIR, first_ignoring};
