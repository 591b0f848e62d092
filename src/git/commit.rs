//! git::commit
//!
//! Commit writer: records each database mutation as one local commit.
//!
//! Commits are strictly local. Nothing in this file fetches or pushes, so
//! note edits never wait on the network.

use std::path::{Path, PathBuf};

use super::error::{CommitWarning, GitSyncError};
use super::repo::Git;
use super::runner::GitCommand;
use crate::core::storage::Storage;
use crate::core::types::DbMutation;

/// Result of [`Git::commit_db_update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus {
    /// A new commit was created.
    Committed,
    /// The file matched HEAD; nothing was committed.
    Unchanged,
}

impl Git {
    /// Stage and commit exactly `db_path` with `message`.
    ///
    /// Other staged or modified files are left out of the commit. Saving
    /// unchanged content is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// - [`GitSyncError::OutsideRepository`] if `db_path` is not inside the clone
    /// - [`GitSyncError::CommandFailed`] if `add` or `commit` fails
    pub fn commit_db_update(&self, db_path: &Path, message: &str) -> Result<CommitStatus, GitSyncError> {
        let rel = self.relative_to_worktree(db_path)?;
        let rel = rel.to_string_lossy().into_owned();

        self.run_checked(&GitCommand::new(["add", "--", rel.as_str()]))?;

        let diff = GitCommand::new(["diff", "--cached", "--quiet", "--", rel.as_str()]);
        let out = self.exec(&diff)?;
        match out.code {
            Some(0) => {
                tracing::debug!(path = %rel, "database unchanged; skipping commit");
                return Ok(CommitStatus::Unchanged);
            }
            Some(1) => {}
            _ => return Err(GitSyncError::command_failed(&diff, &out)),
        }

        self.run_checked(&GitCommand::new(["commit", "-m", message, "--", rel.as_str()]))?;
        tracing::info!(commit_message = message, "recorded database change");
        Ok(CommitStatus::Committed)
    }

    fn relative_to_worktree(&self, db_path: &Path) -> Result<PathBuf, GitSyncError> {
        if let Ok(rel) = db_path.strip_prefix(self.path()) {
            return Ok(rel.to_path_buf());
        }

        // Fall back to canonical forms to see through symlinks and `..`.
        let outside = || GitSyncError::OutsideRepository {
            db: db_path.to_path_buf(),
            repo: self.path().to_path_buf(),
        };
        let repo = self.path().canonicalize().map_err(|_| outside())?;
        let db = db_path.canonicalize().map_err(|_| outside())?;
        db.strip_prefix(&repo)
            .map(Path::to_path_buf)
            .map_err(|_| outside())
    }
}

/// Record a storage mutation in local history.
///
/// Called right after the storage layer commits its own transaction. A
/// failure here does not undo the mutation; it comes back as a warning for
/// the caller to show.
pub fn record_mutation(git: &Git, storage: &dyn Storage, mutation: &DbMutation) -> Option<CommitWarning> {
    let message = mutation.commit_message();
    match git.commit_db_update(storage.path(), &message) {
        Ok(_) => None,
        Err(err) => {
            tracing::warn!(error = %err, commit_message = %message, "database change not recorded");
            Some(CommitWarning::from(err))
        }
    }
}
