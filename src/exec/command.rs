// src/exec/command.rs

//! Turning a command string into something `tokio::process` can start.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

/// A command string split into program and arguments.
///
/// Splitting is plain whitespace splitting: no quoting rules. Commands that
/// need quoting should go through `--use-shell`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Split `command`; `None` for a blank string.
    pub fn parse(command: &str) -> Option<Self> {
        let mut tokens = command.split_whitespace().map(str::to_string);
        let program = tokens.next()?;
        Some(Self {
            program,
            args: tokens.collect(),
        })
    }
}

/// Flag that makes `shell` run a command string.
fn shell_flag(shell: &str) -> &'static str {
    let name = Path::new(shell)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(shell);
    if name.eq_ignore_ascii_case("cmd") {
        "/C"
    } else {
        "-c"
    }
}

/// Build the process for `command`.
///
/// Without a shell the first token is executed directly with the rest as
/// arguments. With a shell, the whole string is handed to it. Standard
/// streams are inherited either way.
pub fn build_command(command: &str, shell: Option<&str>, workdir: &Path) -> Option<Command> {
    let mut cmd = match shell {
        Some(shell) => {
            if command.trim().is_empty() {
                return None;
            }
            let mut c = Command::new(shell);
            c.arg(shell_flag(shell)).arg(command);
            c
        }
        None => {
            let line = CommandLine::parse(command)?;
            let mut c = Command::new(line.program);
            c.args(line.args);
            c
        }
    };

    cmd.current_dir(workdir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    Some(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_token_is_program() {
        let line = CommandLine::parse("cargo  test --all\t-q").unwrap();
        assert_eq!(line.program, "cargo");
        assert_eq!(line.args, vec!["test", "--all", "-q"]);
    }

    #[test]
    fn blank_command_has_no_program() {
        assert_eq!(CommandLine::parse("   "), None);
    }

    #[test]
    fn shell_flags() {
        assert_eq!(shell_flag("bash"), "-c");
        assert_eq!(shell_flag("/usr/bin/zsh"), "-c");
        assert_eq!(shell_flag("cmd.exe"), "/C");
        assert_eq!(shell_flag("CMD"), "/C");
    }

    #[test]
    fn shell_gets_the_whole_line() {
        let cmd = build_command("echo a && echo b", Some("bash"), Path::new("/tmp")).unwrap();
        let std_cmd = cmd.as_std();
        assert_eq!(std_cmd.get_program(), "bash");
        let args: Vec<_> = std_cmd.get_args().collect();
        assert_eq!(args, vec!["-c", "echo a && echo b"]);
        assert_eq!(std_cmd.get_current_dir(), Some(Path::new("/tmp")));
    }

    #[test]
    fn direct_exec_splits_arguments() {
        let cmd = build_command("cargo check --tests", None, Path::new("/tmp")).unwrap();
        let std_cmd = cmd.as_std();
        assert_eq!(std_cmd.get_program(), "cargo");
        let args: Vec<_> = std_cmd.get_args().collect();
        assert_eq!(args, vec!["check", "--tests"]);
    }
}
