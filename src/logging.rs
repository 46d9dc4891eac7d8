// src/logging.rs

//! Logging setup for `cargo-watch-plus` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the filter:
//! 1. `CARGO_WATCH_PLUS_LOG` environment variable (`EnvFilter` syntax)
//! 2. the `--quiet` / `--debug` / `--why` flags
//!
//! Logs are sent to STDERR so that stdout belongs to the commands being run.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::CliArgs;

/// Target of the "why" log lines: which path changed, and which rule set
/// ignored a path.
pub const WHY: &str = "why";

/// Environment variable that overrides the flag-derived filter.
pub const LOG_ENV: &str = "CARGO_WATCH_PLUS_LOG";

/// Verbosity flags as given on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verbosity {
    pub quiet: bool,
    pub debug: bool,
    pub why: bool,
}

impl From<&CliArgs> for Verbosity {
    fn from(args: &CliArgs) -> Self {
        Self {
            quiet: args.quiet,
            debug: args.debug,
            why: args.why,
        }
    }
}

/// Build the filter directives for the given flags.
///
/// Other crates stay at `warn`; `--quiet` still lets warnings and errors
/// through.
pub fn filter_directives(v: Verbosity) -> String {
    let level = if v.debug {
        "debug"
    } else if v.quiet {
        "warn"
    } else {
        "info"
    };
    let why = if v.why || v.debug { "info" } else { "off" };
    format!("warn,cargo_watch_plus={level},{WHY}={why}")
}

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(verbosity: Verbosity) -> Result<()> {
    let filter = match std::env::var(LOG_ENV) {
        Ok(s) if !s.trim().is_empty() => EnvFilter::try_new(s)?,
        _ => EnvFilter::try_new(filter_directives(verbosity))?,
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_info_without_why() {
        assert_eq!(
            filter_directives(Verbosity::default()),
            "warn,cargo_watch_plus=info,why=off"
        );
    }

    #[test]
    fn debug_implies_why() {
        let v = Verbosity {
            debug: true,
            ..Default::default()
        };
        assert_eq!(filter_directives(v), "warn,cargo_watch_plus=debug,why=info");
    }

    #[test]
    fn quiet_keeps_warnings_and_why_on_request() {
        let v = Verbosity {
            quiet: true,
            why: true,
            ..Default::default()
        };
        assert_eq!(filter_directives(v), "warn,cargo_watch_plus=warn,why=info");
    }

    #[test]
    fn directives_parse() {
        for v in [
            Verbosity::default(),
            Verbosity { quiet: true, debug: false, why: false },
            Verbosity { quiet: false, debug: true, why: true },
        ] {
            assert!(EnvFilter::try_new(filter_directives(v)).is_ok());
        }
    }
}
