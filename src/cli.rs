// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! The binary is normally started by cargo as `cargo-watch-plus watch-plus
//! [ARGS]`, so the arguments are wrapped in a `cargo` subcommand. Running the
//! binary directly (`cargo-watch-plus [ARGS]`) works too.

use std::ffi::OsString;

use clap::{Args, Parser};

/// Name of the cargo subcommand this binary implements.
pub const SUBCOMMAND: &str = "watch-plus";

const AFTER_HELP: &str = "Cargo commands (-x) are always executed before shell commands (-s).\n\n\
By default, your entire project is watched, except for the 'target' and '.git' folders, \
and your '.ignore' and '.gitignore' files are used to filter paths.";

#[derive(Debug, Parser)]
#[command(name = "cargo", bin_name = "cargo")]
enum CargoCli {
    /// Watches over your Cargo project's source.
    #[command(version, after_help = AFTER_HELP)]
    WatchPlus(CliArgs),
}

#[derive(Debug, Parser)]
#[command(
    name = "cargo-watch-plus",
    version,
    about = "Watches over your Cargo project's source.",
    after_help = AFTER_HELP
)]
struct StandaloneCli {
    #[command(flatten)]
    args: CliArgs,
}

/// Command-line arguments for `cargo watch-plus`.
#[derive(Debug, Clone, Args)]
pub struct CliArgs {
    /// Clear the screen before each run.
    #[arg(short = 'c', long)]
    pub clear: bool,

    /// Ignore nothing, not even 'target/' and '.git/'.
    #[arg(long)]
    pub ignore_nothing: bool,

    /// Show debug output.
    #[arg(long)]
    pub debug: bool,

    /// Show paths that changed.
    #[arg(long)]
    pub why: bool,

    /// Suppress output from cargo-watch-plus itself.
    #[arg(short = 'q', long, conflicts_with = "debug")]
    pub quiet: bool,

    /// Don't use '.gitignore' files.
    #[arg(long)]
    pub no_gitignore: bool,

    /// Don't use '.ignore' files.
    #[arg(long)]
    pub no_ignore: bool,

    /// Don't restart a command while it's still running.
    #[arg(long)]
    pub no_restart: bool,

    /// Force use of polling for file changes.
    #[arg(long)]
    pub poll: bool,

    /// Postpone first run until a file changes.
    #[arg(long)]
    pub postpone: bool,

    /// Ignore events emitted while the commands run.
    #[arg(long)]
    pub watch_when_idle: bool,

    /// Cargo command(s) to execute on changes. Defaults to 'check'.
    #[arg(short = 'x', long = "exec", value_name = "CMD", num_args = 1..)]
    pub exec: Vec<String>,

    /// Shell command(s) to execute on changes.
    #[arg(short = 's', long = "shell", value_name = "CMD", num_args = 1..)]
    pub shell: Vec<String>,

    /// File updates debounce delay in seconds.
    #[arg(
        short = 'd',
        long,
        value_name = "SECS",
        default_value_t = 0.5,
        allow_negative_numbers = true
    )]
    pub delay: f64,

    /// Ignore a glob/gitignore-style pattern.
    #[arg(short = 'i', long = "ignore", value_name = "PATTERN", num_args = 1..)]
    pub ignore: Vec<String>,

    /// Use a different shell. E.g. --use-shell=bash
    #[arg(long, value_name = "SHELL")]
    pub use_shell: Option<String>,

    /// Watch a specific file or folder.
    #[arg(short = 'w', long, value_name = "PATH", default_value = ".")]
    pub watch: String,

    /// Change working directory before running commands. Defaults to crate root.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub workdir: Option<String>,
}

/// Parse arguments from the process environment.
pub fn parse() -> CliArgs {
    parse_from(std::env::args_os())
}

/// Parse arguments, accepting both the cargo-subcommand and the standalone
/// invocation forms.
pub fn parse_from<I, T>(args: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if is_cargo_invocation(&args) {
        let CargoCli::WatchPlus(args) = CargoCli::parse_from(args);
        args
    } else {
        StandaloneCli::parse_from(args).args
    }
}

fn is_cargo_invocation(args: &[OsString]) -> bool {
    args.get(1).is_some_and(|a| a == SUBCOMMAND)
}
