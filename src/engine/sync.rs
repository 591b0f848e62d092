//! engine::sync
//!
//! Sync orchestrator.
//!
//! # State machine
//!
//! ```text
//! start -> clean_check -> fetch -> classify -> { resolve | report } -> done
//! ```
//!
//! - `clean_check` fails fast on uncommitted changes to tracked files; an
//!   uncommitted database change could be lost by a reset or wrongly
//!   bundled into a forced push.
//! - `resolve` is entered only for `remote_ahead` and `diverged` and needs
//!   the user's choice. Without a terminal the sync fails instead.
//! - Every other state resolves itself (`report`).
//!
//! Phases run strictly in this order; each depends on what the previous one
//! observed.

use std::fmt;

use crate::core::types::ResolutionChoice;
use crate::git::{Git, GitSyncError, RemoteSnapshot};
use crate::ui::prompts::{PromptError, Prompter};

use super::resolve::{self, Resolution, SyncOutcome};

/// A step of the sync state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Start,
    CleanCheck,
    Fetch,
    Classify,
    Resolve,
    Report,
    Done,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::CleanCheck => "clean_check",
            Self::Fetch => "fetch",
            Self::Classify => "classify",
            Self::Resolve => "resolve",
            Self::Report => "report",
            Self::Done => "done",
        })
    }
}

/// Runs one sync of the notes clone against `origin`.
pub struct Synchronizer<'a> {
    git: &'a Git,
    dry_run: bool,
    phases: Vec<SyncPhase>,
}

impl<'a> Synchronizer<'a> {
    pub fn new(git: &'a Git, dry_run: bool) -> Self {
        Self {
            git,
            dry_run,
            phases: Vec::new(),
        }
    }

    /// Phases entered by the last [`Synchronizer::run`], in order.
    pub fn phases(&self) -> &[SyncPhase] {
        &self.phases
    }

    /// Run the state machine to completion.
    ///
    /// `prompter` is consulted only for `remote_ahead` and `diverged`.
    ///
    /// # Errors
    ///
    /// - [`GitSyncError::DirtyWorktree`] before any fetch if tracked files are modified
    /// - [`GitSyncError::Connectivity`] if the fetch or a push fails on the network
    /// - [`GitSyncError::NonInteractiveConflict`] if a choice is needed and `prompter` cannot ask
    /// - [`GitSyncError::ConcurrentModification`] if the remote moved after the fetch
    pub fn run(&mut self, prompter: &mut dyn Prompter) -> Result<SyncOutcome, GitSyncError> {
        self.phases.clear();
        self.enter(SyncPhase::Start);

        self.enter(SyncPhase::CleanCheck);
        let dirty = self.git.dirty_paths()?;
        if !dirty.is_empty() {
            return Err(GitSyncError::DirtyWorktree {
                details: dirty.join(", "),
            });
        }

        self.enter(SyncPhase::Fetch);
        self.git.fetch_prune()?;

        self.enter(SyncPhase::Classify);
        let snapshot = self.git.remote_snapshot()?;
        tracing::info!(
            branch = %snapshot.branch,
            state = %snapshot.state,
            ahead = snapshot.ahead,
            behind = snapshot.behind,
            "classified"
        );

        let outcome = match Resolution::automatic(snapshot.state) {
            Some(resolution) => {
                self.enter(SyncPhase::Report);
                self.report(resolution, &snapshot)?
            }
            None => {
                self.enter(SyncPhase::Resolve);
                let choice = self.ask(prompter, &snapshot)?;
                resolve::execute(self.git, Resolution::for_conflict(choice), &snapshot, self.dry_run)?
            }
        };

        self.enter(SyncPhase::Done);
        Ok(outcome)
    }

    fn report(&self, resolution: Resolution, snapshot: &RemoteSnapshot) -> Result<SyncOutcome, GitSyncError> {
        // A fresh clone of an empty remote has no commit to push yet.
        if resolution == Resolution::PushSetUpstream && snapshot.local_oid.is_none() {
            tracing::info!(branch = %snapshot.branch, "branch has no commits; nothing to push");
            return Ok(SyncOutcome::NothingToSync);
        }
        resolve::execute(self.git, resolution, snapshot, self.dry_run)
    }

    fn ask(&self, prompter: &mut dyn Prompter, snapshot: &RemoteSnapshot) -> Result<ResolutionChoice, GitSyncError> {
        match prompter.choose_resolution(snapshot.state) {
            Ok(choice) => {
                tracing::info!(%choice, state = %snapshot.state, "resolution chosen");
                Ok(choice)
            }
            Err(PromptError::NotInteractive) => Err(GitSyncError::NonInteractiveConflict {
                state: snapshot.state,
            }),
            Err(PromptError::Cancelled) => Ok(ResolutionChoice::Abort),
            Err(PromptError::IoError(message)) => Err(GitSyncError::Io {
                context: "failed to read resolution choice".to_string(),
                source: std::io::Error::other(message),
            }),
        }
    }

    fn enter(&mut self, phase: SyncPhase) {
        tracing::info!(%phase, dry_run = self.dry_run, "sync phase");
        self.phases.push(phase);
    }
}
