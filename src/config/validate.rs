// src/config/validate.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::CliArgs;
use crate::config::model::{CARGO, DEFAULT_EXEC, DOT_IGNORE, GIT_IGNORE, WatchConfig};
use crate::errors::{Result, WatchPlusError};
use crate::filter::IgnoreRuleSet;
use crate::fs::FileSystem;
use crate::types::{OverlapPolicy, TriggerPolicy};

impl WatchConfig {
    /// Validate CLI arguments and resolve them into a configuration.
    ///
    /// `project_root` is the directory used as working directory when
    /// `--workdir` is absent. Relative `--workdir` and `--watch` values are
    /// resolved the same way the process will see them after switching
    /// directories.
    pub fn from_args(args: CliArgs, project_root: &Path, fs: &dyn FileSystem) -> Result<Self> {
        let delay = validate_delay(args.delay)?;
        let commands = compose_commands(&args.exec, &args.shell)?;
        validate_ignore_patterns(&args.ignore)?;

        let workdir = match &args.workdir {
            Some(dir) => project_root.join(dir),
            None => project_root.to_path_buf(),
        };
        if !fs.is_dir(&workdir) {
            return Err(WatchPlusError::ConfigError(format!(
                "working directory {:?} is not a directory",
                workdir
            )));
        }
        let workdir = fs.canonicalize(&workdir)?;

        let watch_root = if Path::new(&args.watch) == Path::new(".") {
            workdir.clone()
        } else {
            workdir.join(&args.watch)
        };
        if !fs.exists(&watch_root) {
            return Err(WatchPlusError::ConfigError(format!(
                "watch path {:?} does not exist",
                args.watch
            )));
        }
        let watch_root = fs.canonicalize(&watch_root)?;

        let mut ignore_files = Vec::new();
        if !args.no_gitignore {
            ignore_files.push(GIT_IGNORE.to_string());
        }
        if !args.no_ignore {
            ignore_files.push(DOT_IGNORE.to_string());
        }

        Ok(WatchConfig {
            watch_root,
            delay,
            ignore_nothing: args.ignore_nothing,
            extra_ignores: args.ignore,
            ignore_files,
            overlap: if args.no_restart {
                OverlapPolicy::NoRestart
            } else {
                OverlapPolicy::Allow
            },
            trigger: if args.watch_when_idle {
                TriggerPolicy::WhenIdle
            } else {
                TriggerPolicy::Always
            },
            commands,
            clear: args.clear,
            postpone: args.postpone,
            poll: args.poll,
            workdir,
            shell: args.use_shell.filter(|s| !s.trim().is_empty()),
        })
    }
}

fn validate_delay(secs: f64) -> Result<Duration> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(WatchPlusError::ConfigError(format!(
            "--delay must be a non-negative number of seconds (got {secs})"
        )));
    }
    Duration::try_from_secs_f64(secs).map_err(|err| {
        WatchPlusError::ConfigError(format!("--delay {secs} is out of range: {err}"))
    })
}

/// Build the ordered command list: `cargo <exec>` entries, then shell
/// entries. With neither given, `cargo check`.
pub fn compose_commands(exec: &[String], shell: &[String]) -> Result<Vec<String>> {
    if let Some(bad) = exec.iter().chain(shell).find(|c| c.trim().is_empty()) {
        return Err(WatchPlusError::ConfigError(format!(
            "empty command {bad:?} is not allowed"
        )));
    }

    if exec.is_empty() && shell.is_empty() {
        return Ok(vec![format!("{CARGO} {DEFAULT_EXEC}")]);
    }

    Ok(exec
        .iter()
        .map(|c| format!("{CARGO} {}", c.trim()))
        .chain(shell.iter().map(|c| c.trim().to_string()))
        .collect())
}

fn validate_ignore_patterns(patterns: &[String]) -> Result<()> {
    for pattern in patterns {
        ignore::gitignore::GitignoreBuilder::new(PathBuf::from("."))
            .add_line(None, pattern)
            .map_err(|err| {
                WatchPlusError::ConfigError(format!("invalid --ignore pattern {pattern:?}: {err}"))
            })?;
    }
    // Compile the whole set once as well; this is what the built-in rule
    // set will do at runtime.
    IgnoreRuleSet::built_in(".", patterns)?;
    Ok(())
}
