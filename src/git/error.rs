//! git::error
//!
//! Error taxonomy for the synchronization engine.
//!
//! Every failure inside the engine becomes a [`GitSyncError`]. Variants that
//! stem from a git invocation carry the rendered command and its stderr so
//! the CLI can show them verbatim. [`GitSyncError::kind`] groups variants
//! into the categories callers act on. Nothing here is retried.

use std::path::PathBuf;

use thiserror::Error;

use super::runner::{GitCommand, ProcessOutput, RunnerError};
use crate::core::types::DivergenceState;

/// Category of a [`GitSyncError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Local path is not a usable clone of the configured remote. Needs manual correction.
    Configuration,
    /// Network or auth failure during clone/fetch/push. Safe to retry later.
    Connectivity,
    /// Uncommitted changes to tracked files at sync time.
    DirtyWorktree,
    /// A conflict needed a choice but no terminal was attached.
    NonInteractiveConflict,
    /// The remote moved between fetch and push.
    ConcurrentModification,
    /// The git binary is missing or could not be spawned.
    Environment,
    /// A local git command failed for another reason.
    Command,
}

/// Errors from the synchronization engine.
#[derive(Debug, Error)]
pub enum GitSyncError {
    /// `git` is not on PATH.
    #[error("git executable not found on PATH; install git to use sync")]
    GitNotFound,

    /// The process could not be spawned.
    #[error(transparent)]
    Spawn(RunnerError),

    /// The local path is not a git working tree.
    #[error("{path} is not a git repository")]
    NotARepository { path: PathBuf },

    /// The clone's origin does not match the configured remote.
    #[error(
        "repository at {path} has origin '{}', expected '{expected}'",
        .actual.as_deref().unwrap_or("none")
    )]
    OriginMismatch {
        path: PathBuf,
        expected: String,
        actual: Option<String>,
    },

    /// The current branch tracks something other than its namesake on `origin`.
    #[error(
        "branch '{branch}' tracks '{upstream}', expected 'origin/{branch}'; \
         run 'git branch --set-upstream-to=origin/{branch}' in the notes repository"
    )]
    UpstreamMismatch { branch: String, upstream: String },

    /// HEAD does not point at a branch.
    #[error("repository at {path} is in detached HEAD state; check out a branch first")]
    DetachedHead { path: PathBuf },

    /// The database file is outside the clone and cannot be tracked.
    #[error("database file {db} is not inside repository {repo}")]
    OutsideRepository { db: PathBuf, repo: PathBuf },

    /// Filesystem error around the clone.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Clone, fetch or push failed (network, auth, missing remote).
    #[error("`{command}` failed: {stderr}")]
    Connectivity { command: String, stderr: String },

    /// Tracked files have uncommitted changes.
    #[error("working tree has uncommitted changes ({details}); commit or stash before syncing")]
    DirtyWorktree { details: String },

    /// A conflict arose without a terminal to ask.
    #[error(
        "local and remote are {state}; cannot prompt in a non-interactive session. \
         Re-run in a terminal or resolve manually"
    )]
    NonInteractiveConflict { state: DivergenceState },

    /// Push rejected because the remote changed after the last fetch.
    #[error("`{command}` was rejected because the remote changed since the last fetch; run sync again: {stderr}")]
    ConcurrentModification { command: String, stderr: String },

    /// Git printed something the engine could not interpret.
    #[error("unexpected output from `{command}`: {output}")]
    UnexpectedOutput { command: String, output: String },

    /// Any other failed git command.
    #[error("`{command}` failed with exit code {}: {stderr}", .code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl GitSyncError {
    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::GitNotFound | Self::Spawn(_) => ErrorKind::Environment,
            Self::NotARepository { .. }
            | Self::OriginMismatch { .. }
            | Self::DetachedHead { .. }
            | Self::UpstreamMismatch { .. }
            | Self::OutsideRepository { .. } => ErrorKind::Configuration,
            Self::Connectivity { .. } => ErrorKind::Connectivity,
            Self::DirtyWorktree { .. } => ErrorKind::DirtyWorktree,
            Self::NonInteractiveConflict { .. } => ErrorKind::NonInteractiveConflict,
            Self::ConcurrentModification { .. } => ErrorKind::ConcurrentModification,
            Self::Io { .. } | Self::UnexpectedOutput { .. } | Self::CommandFailed { .. } => {
                ErrorKind::Command
            }
        }
    }

    /// Generic failure of `command`.
    pub(crate) fn command_failed(command: &GitCommand, output: &ProcessOutput) -> Self {
        Self::CommandFailed {
            command: command.to_string(),
            code: output.code,
            stderr: output.stderr_trimmed().to_string(),
        }
    }

    /// Network-class failure of `command`.
    pub(crate) fn connectivity(command: &GitCommand, output: &ProcessOutput) -> Self {
        Self::Connectivity {
            command: command.to_string(),
            stderr: output.stderr_trimmed().to_string(),
        }
    }

    /// Classify a failed push: rejections mean the remote moved, anything
    /// else is treated as connectivity.
    pub(crate) fn push_failed(command: &GitCommand, output: &ProcessOutput) -> Self {
        if is_rejection(&output.stderr) {
            Self::ConcurrentModification {
                command: command.to_string(),
                stderr: output.stderr_trimmed().to_string(),
            }
        } else {
            Self::connectivity(command, output)
        }
    }

    pub(crate) fn unexpected(command: &GitCommand, output: &str) -> Self {
        Self::UnexpectedOutput {
            command: command.to_string(),
            output: output.trim().to_string(),
        }
    }
}

impl From<RunnerError> for GitSyncError {
    fn from(err: RunnerError) -> Self {
        match err {
            RunnerError::NotFound { .. } => Self::GitNotFound,
            RunnerError::MissingDirectory { path } => Self::NotARepository { path },
            other => Self::Spawn(other),
        }
    }
}

/// Whether push stderr reports a lease or fast-forward rejection.
fn is_rejection(stderr: &str) -> bool {
    const MARKERS: [&str; 4] = ["stale info", "[rejected]", "non-fast-forward", "fetch first"];
    MARKERS.iter().any(|m| stderr.contains(m))
}

/// A note mutation succeeded but could not be recorded in history.
///
/// The data is safe on disk; the next successful commit picks it up.
#[derive(Debug, Error)]
#[error("note saved, but recording it in git history failed: {source}")]
pub struct CommitWarning {
    #[from]
    pub source: GitSyncError,
}
