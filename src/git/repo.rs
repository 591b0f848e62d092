//! git::repo
//!
//! Local repository manager.
//!
//! [`Git`] owns the [`RepositoryHandle`] and the [`ProcessRunner`] every
//! other git operation goes through. This file covers the clone lifecycle
//! and local validity checks; the commit writer and remote analysis live
//! in sibling modules as further `impl Git` blocks.
//!
//! # Invariants
//!
//! If `local_path` exists it must be a git working tree whose `origin`
//! equals `remote_url` exactly. Mismatches are reported, never corrected.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::GitSyncError;
use super::runner::{GitCommand, ProcessOutput, ProcessRunner, SystemRunner};

/// Name of the only remote the engine talks to.
pub const REMOTE_NAME: &str = "origin";

/// Location of the local clone and the remote it must track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryHandle {
    pub local_path: PathBuf,
    pub remote_url: String,
}

impl RepositoryHandle {
    pub fn new(local_path: impl Into<PathBuf>, remote_url: impl Into<String>) -> Self {
        Self {
            local_path: local_path.into(),
            remote_url: remote_url.into(),
        }
    }
}

/// Result of [`Git::ensure_local_clone`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneStatus {
    /// The clone was created by this call.
    Cloned,
    /// A valid clone was already present.
    Existing,
}

/// Interface to the local clone.
pub struct Git {
    handle: RepositoryHandle,
    runner: Box<dyn ProcessRunner>,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git").field("handle", &self.handle).finish_non_exhaustive()
    }
}

impl Git {
    /// Create an interface that runs commands through `runner`.
    pub fn new(handle: RepositoryHandle, runner: Box<dyn ProcessRunner>) -> Self {
        Self { handle, runner }
    }

    /// Create an interface backed by the real `git` binary.
    pub fn system(handle: RepositoryHandle) -> Self {
        Self::new(handle, Box::new(SystemRunner))
    }

    pub fn handle(&self) -> &RepositoryHandle {
        &self.handle
    }

    /// Path of the working tree.
    pub fn path(&self) -> &Path {
        &self.handle.local_path
    }

    /// Make sure a valid clone of the configured remote exists.
    ///
    /// Clones when `local_path` is missing (the only network access).
    /// Otherwise only checks local metadata, so calling it twice has no
    /// further effect.
    ///
    /// # Errors
    ///
    /// - [`GitSyncError::Connectivity`] if the clone fails
    /// - [`GitSyncError::NotARepository`] if the path exists but is not a working tree
    /// - [`GitSyncError::OriginMismatch`] if `origin` differs from the configured URL
    pub fn ensure_local_clone(&self) -> Result<CloneStatus, GitSyncError> {
        let path = self.path();
        if !path.exists() {
            self.clone_remote()?;
            return Ok(CloneStatus::Cloned);
        }

        self.verify_repository()?;
        self.verify_origin()?;
        tracing::debug!(path = %path.display(), "existing clone verified");
        Ok(CloneStatus::Existing)
    }

    /// Whether `local_path` holds a clone of the configured remote.
    ///
    /// Never fails; any problem reads as "not valid".
    pub fn is_valid_repo(&self) -> bool {
        self.path().exists() && self.verify_repository().is_ok() && self.verify_origin().is_ok()
    }

    /// The configured `origin` URL, if any.
    pub fn origin_url(&self) -> Result<Option<String>, GitSyncError> {
        let key = format!("remote.{REMOTE_NAME}.url");
        let cmd = GitCommand::new(["config", "--get", key.as_str()]);
        let out = self.exec(&cmd)?;
        match out.code {
            Some(0) => Ok(Some(out.stdout_trimmed().to_string())),
            // `git config --get` exits 1 when the key is unset.
            Some(1) => Ok(None),
            _ => Err(GitSyncError::command_failed(&cmd, &out)),
        }
    }

    /// Whether tracked files have no uncommitted changes.
    pub fn is_worktree_clean(&self) -> Result<bool, GitSyncError> {
        Ok(self.dirty_paths()?.is_empty())
    }

    /// Tracked paths with uncommitted changes. Untracked files are ignored.
    pub fn dirty_paths(&self) -> Result<Vec<String>, GitSyncError> {
        let cmd = GitCommand::new(["status", "--porcelain", "--untracked-files=no"]);
        let out = self.run_checked(&cmd)?;
        Ok(out
            .stdout
            .lines()
            .filter(|line| line.len() > 3)
            .map(|line| line[3..].to_string())
            .collect())
    }

    /// The `git clone` invocation [`Git::ensure_local_clone`] runs when the
    /// clone is missing. URL and path follow `--` so neither reads as an option.
    pub fn clone_command(&self) -> GitCommand {
        GitCommand::new(["clone", "--", self.handle.remote_url.as_str()]).arg(self.path().to_string_lossy())
    }

    fn clone_remote(&self) -> Result<(), GitSyncError> {
        let path = self.path();
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(parent) = parent {
            fs::create_dir_all(parent).map_err(|e| GitSyncError::Io {
                context: format!("failed to create {}", parent.display()),
                source: e,
            })?;
        }

        let cmd = self.clone_command();
        tracing::info!(remote = %self.handle.remote_url, path = %path.display(), "cloning notes repository");
        let out = self.runner.run(&cmd, None)?;
        if !out.success() {
            return Err(GitSyncError::connectivity(&cmd, &out));
        }
        Ok(())
    }

    fn verify_repository(&self) -> Result<(), GitSyncError> {
        let path = self.path();
        let not_a_repo = || GitSyncError::NotARepository {
            path: path.to_path_buf(),
        };

        if !path.is_dir() || !path.join(".git").exists() {
            return Err(not_a_repo());
        }

        let out = self.exec(&GitCommand::new(["rev-parse", "--is-inside-work-tree"]))?;
        if !out.success() || out.stdout_trimmed() != "true" {
            return Err(not_a_repo());
        }
        Ok(())
    }

    fn verify_origin(&self) -> Result<(), GitSyncError> {
        let actual = self.origin_url()?;
        if actual.as_deref() != Some(self.handle.remote_url.as_str()) {
            return Err(GitSyncError::OriginMismatch {
                path: self.path().to_path_buf(),
                expected: self.handle.remote_url.clone(),
                actual,
            });
        }
        Ok(())
    }

    /// Run `cmd` inside the clone, returning the output whatever the exit code.
    pub(crate) fn exec(&self, cmd: &GitCommand) -> Result<ProcessOutput, GitSyncError> {
        Ok(self.runner.run(cmd, Some(self.path()))?)
    }

    /// Run `cmd` inside the clone, failing on a non-zero exit.
    pub(crate) fn run_checked(&self, cmd: &GitCommand) -> Result<ProcessOutput, GitSyncError> {
        let out = self.exec(cmd)?;
        if !out.success() {
            return Err(GitSyncError::command_failed(cmd, &out));
        }
        Ok(out)
    }
}
