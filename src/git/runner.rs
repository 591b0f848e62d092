//! git::runner
//!
//! Process runner: the seam between the engine and the `git` binary.
//!
//! Everything above this module describes a git invocation as a
//! [`GitCommand`] value and hands it to a [`ProcessRunner`]. Production code
//! uses [`SystemRunner`]; tests use [`super::mock::ScriptedRunner`].

use std::fmt;
use std::path::Path;
use std::process::Command;

use thiserror::Error;

/// Name of the version-control binary resolved from `PATH`.
pub const GIT_PROGRAM: &str = "git";

/// Errors from spawning a process (as opposed to the process failing).
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The binary could not be found on `PATH`.
    #[error("'{program}' not found on PATH")]
    NotFound { program: String },

    /// The working directory does not exist.
    #[error("working directory '{}' does not exist", .path.display())]
    MissingDirectory { path: std::path::PathBuf },

    /// Spawning or waiting for the process failed.
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// A single invocation of the version-control binary.
///
/// `Display` renders the command the way a user would type it, which is
/// what dry-run output and error messages show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommand {
    args: Vec<String>,
}

impl GitCommand {
    /// Build a command from its arguments (without the program name).
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// The program to run.
    pub fn program(&self) -> &str {
        GIT_PROGRAM
    }

    /// Arguments, excluding the program name.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Whether the arguments begin with `prefix`.
    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        self.args.len() >= prefix.len()
            && self.args.iter().zip(prefix).all(|(a, p)| a == p)
    }
}

impl fmt::Display for GitCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg.replace('\'', "'\\''"))?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code; `None` if the process was killed by a signal.
    pub code: Option<i32>,
}

impl ProcessOutput {
    /// A successful run with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            code: Some(0),
        }
    }

    /// A failed run with the given exit code and stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            code: Some(code),
        }
    }

    /// Whether the process exited with status 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stdout without surrounding whitespace.
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }

    /// Stderr without surrounding whitespace.
    pub fn stderr_trimmed(&self) -> &str {
        self.stderr.trim()
    }
}

/// Runs version-control commands.
///
/// Implementations block until the process exits. There is no timeout and
/// no cancellation beyond the child's own signal handling.
pub trait ProcessRunner {
    /// Run `command` in `cwd` (or the current directory) and capture its output.
    ///
    /// A non-zero exit is *not* an error at this level; callers inspect
    /// [`ProcessOutput::code`].
    fn run(&self, command: &GitCommand, cwd: Option<&Path>) -> Result<ProcessOutput, RunnerError>;
}

/// Runner that spawns the real `git` binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, command: &GitCommand, cwd: Option<&Path>) -> Result<ProcessOutput, RunnerError> {
        let mut cmd = Command::new(command.program());
        cmd.args(command.args()).env("LC_ALL", "C");
        if let Some(dir) = cwd {
            // Spawning in a missing directory also reports NotFound.
            if !dir.is_dir() {
                return Err(RunnerError::MissingDirectory {
                    path: dir.to_path_buf(),
                });
            }
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RunnerError::NotFound {
                    program: command.program().to_string(),
                }
            } else {
                RunnerError::Spawn {
                    command: command.to_string(),
                    source: e,
                }
            }
        })?;

        let result = ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            code: output.status.code(),
        };
        tracing::debug!(
            command = %command,
            cwd = ?cwd,
            code = ?result.code,
            "git invocation finished"
        );
        Ok(result)
    }
}
