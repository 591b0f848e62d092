//! engine::resolve
//!
//! Resolution executor: one action per (divergence state, choice) pair.
//!
//! | State                    | Choice      | Action                         |
//! |--------------------------|-------------|--------------------------------|
//! | `no_upstream`            |             | `git push -u origin <b>`       |
//! | `local_ahead`            |             | `git push origin <b>`          |
//! | `up_to_date`             |             | nothing                        |
//! | `remote_ahead`/`diverged`| remote-wins | `git reset --hard origin/<b>`  |
//! | `remote_ahead`/`diverged`| local-wins  | `git push --force-with-lease…` |
//! | `remote_ahead`/`diverged`| abort       | nothing                        |
//!
//! # Invariants
//!
//! - Planning is pure; only [`execute`] runs commands
//! - In dry-run mode [`execute`] runs nothing and reports the command
//! - The forced push always leases against the tip observed at classify time

use std::fmt;

use thiserror::Error;

use crate::core::types::{BranchName, DivergenceState, Oid, ResolutionChoice};
use crate::git::{
    force_push_with_lease_command, hard_reset_command, push_command, push_set_upstream_command,
    Git, GitCommand, GitSyncError, RemoteSnapshot, REMOTE_NAME,
};

/// Errors from resolution planning.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    /// A conflict state was planned without the user's choice.
    #[error("{state} requires a resolution choice (local-wins, remote-wins or abort)")]
    ChoiceRequired { state: DivergenceState },
}

/// The action taken to reconcile local and remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    NoOp,
    Push,
    PushSetUpstream,
    HardReset,
    ForcePushWithLease,
    Abort,
}

impl Resolution {
    /// Plan the action for `state`, using `choice` for conflict states.
    ///
    /// A choice given for a state that resolves itself is ignored.
    ///
    /// ```
    /// use terminotes::core::types::{DivergenceState, ResolutionChoice};
    /// use terminotes::engine::resolve::Resolution;
    ///
    /// assert_eq!(
    ///     Resolution::plan(DivergenceState::Diverged, Some(ResolutionChoice::RemoteWins)),
    ///     Ok(Resolution::HardReset)
    /// );
    /// assert!(Resolution::plan(DivergenceState::RemoteAhead, None).is_err());
    /// ```
    pub fn plan(state: DivergenceState, choice: Option<ResolutionChoice>) -> Result<Self, PlanError> {
        match (Self::automatic(state), choice) {
            (Some(resolution), _) => Ok(resolution),
            (None, Some(choice)) => Ok(Self::for_conflict(choice)),
            (None, None) => Err(PlanError::ChoiceRequired { state }),
        }
    }

    /// The action for a state that needs no user input, `None` for conflicts.
    pub fn automatic(state: DivergenceState) -> Option<Self> {
        match state {
            DivergenceState::UpToDate => Some(Self::NoOp),
            DivergenceState::LocalAhead => Some(Self::Push),
            DivergenceState::NoUpstream => Some(Self::PushSetUpstream),
            DivergenceState::RemoteAhead | DivergenceState::Diverged => None,
        }
    }

    /// The action for a conflict state once the user has chosen.
    pub fn for_conflict(choice: ResolutionChoice) -> Self {
        match choice {
            ResolutionChoice::LocalWins => Self::ForcePushWithLease,
            ResolutionChoice::RemoteWins => Self::HardReset,
            ResolutionChoice::Abort => Self::Abort,
        }
    }

    /// Whether the action can discard commits.
    pub fn is_destructive(self) -> bool {
        matches!(self, Self::HardReset | Self::ForcePushWithLease)
    }

    /// The git invocation this action runs, if any.
    ///
    /// Without an observed remote tip the lease falls back to git's own
    /// remote-tracking ref, which is the same value fetched moments earlier.
    pub fn command(self, branch: &BranchName, remote_oid: Option<&Oid>) -> Option<GitCommand> {
        match self {
            Self::NoOp | Self::Abort => None,
            Self::Push => Some(push_command(branch)),
            Self::PushSetUpstream => Some(push_set_upstream_command(branch)),
            Self::HardReset => Some(hard_reset_command(branch)),
            Self::ForcePushWithLease => Some(match remote_oid {
                Some(oid) => force_push_with_lease_command(branch, oid),
                None => GitCommand::new(["push"])
                    .arg(format!("--force-with-lease={branch}"))
                    .arg(REMOTE_NAME)
                    .arg(branch.as_str()),
            }),
        }
    }

    /// What the action does, phrased to follow "would".
    fn describe(self, branch: &BranchName) -> String {
        match self {
            Self::NoOp => "do nothing".to_string(),
            Self::Abort => "abort".to_string(),
            Self::Push => format!("push updates to {REMOTE_NAME}/{branch}"),
            Self::PushSetUpstream => format!("push and set upstream to {REMOTE_NAME}/{branch}"),
            Self::HardReset => format!("replace local DB with {REMOTE_NAME}/{branch} version"),
            Self::ForcePushWithLease => format!("force-push local DB to {REMOTE_NAME}/{branch}"),
        }
    }
}

/// What a sync did, as reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    NothingToSync,
    Pushed { branch: BranchName },
    PushedSetUpstream { branch: BranchName },
    ReplacedLocal { branch: BranchName },
    ForcePushed { branch: BranchName },
    Aborted,
    /// Nothing ran; `command` is what would have.
    DryRun { action: String, command: String },
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingToSync => f.write_str("Already up to date; nothing to sync."),
            Self::Pushed { branch } => write!(f, "Pushed updates to {REMOTE_NAME}/{branch}"),
            Self::PushedSetUpstream { branch } => {
                write!(f, "Pushed and set upstream to {REMOTE_NAME}/{branch}")
            }
            Self::ReplacedLocal { branch } => {
                write!(f, "Replaced local DB with {REMOTE_NAME}/{branch} version")
            }
            Self::ForcePushed { branch } => write!(f, "Force-pushed local DB to {REMOTE_NAME}/{branch}"),
            Self::Aborted => f.write_str("Sync aborted; nothing was changed."),
            Self::DryRun { action, command } => write!(f, "Dry-run: would {action} ('{command}')"),
        }
    }
}

/// Carry out `resolution` against the state captured in `snapshot`.
///
/// # Errors
///
/// - [`GitSyncError::ConcurrentModification`] if a push is rejected because the remote moved
/// - [`GitSyncError::Connectivity`] for other push failures
/// - [`GitSyncError::CommandFailed`] if the reset fails
pub fn execute(
    git: &Git,
    resolution: Resolution,
    snapshot: &RemoteSnapshot,
    dry_run: bool,
) -> Result<SyncOutcome, GitSyncError> {
    let branch = &snapshot.branch;
    let Some(cmd) = resolution.command(branch, snapshot.remote_oid.as_ref()) else {
        return Ok(match resolution {
            Resolution::Abort => SyncOutcome::Aborted,
            _ => SyncOutcome::NothingToSync,
        });
    };

    if dry_run {
        tracing::info!(command = %cmd, "dry run; not executing");
        return Ok(SyncOutcome::DryRun {
            action: resolution.describe(branch),
            command: cmd.to_string(),
        });
    }

    if resolution.is_destructive() {
        tracing::warn!(command = %cmd, state = %snapshot.state, "running destructive resolution");
    }

    let branch = branch.clone();
    match resolution {
        Resolution::Push | Resolution::PushSetUpstream | Resolution::ForcePushWithLease => {
            git.run_push(&cmd)?;
        }
        Resolution::HardReset => {
            git.hard_reset_to_remote(&branch)?;
        }
        Resolution::NoOp | Resolution::Abort => {}
    }

    Ok(match resolution {
        Resolution::Push => SyncOutcome::Pushed { branch },
        Resolution::PushSetUpstream => SyncOutcome::PushedSetUpstream { branch },
        Resolution::HardReset => SyncOutcome::ReplacedLocal { branch },
        Resolution::ForcePushWithLease => SyncOutcome::ForcePushed { branch },
        Resolution::Abort => SyncOutcome::Aborted,
        Resolution::NoOp => SyncOutcome::NothingToSync,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::mock::ScriptedRunner;
    use crate::git::{ProcessOutput, RepositoryHandle, Upstream};

    const REMOTE_TIP: &str = "2222222222222222222222222222222222222222";

    fn main() -> BranchName {
        BranchName::new("main").unwrap()
    }

    fn snapshot(state: DivergenceState) -> RemoteSnapshot {
        let upstream = (state != DivergenceState::NoUpstream).then(|| Upstream {
            remote: "origin".into(),
            branch: main(),
        });
        RemoteSnapshot {
            branch: main(),
            remote_oid: upstream.as_ref().map(|_| Oid::new(REMOTE_TIP).unwrap()),
            upstream,
            ahead: 1,
            behind: 1,
            local_oid: Some(Oid::new("1111111111111111111111111111111111111111").unwrap()),
            state,
        }
    }

    fn git(runner: &ScriptedRunner) -> Git {
        Git::new(
            RepositoryHandle::new("/data/notes", "git@example.com:me/notes.git"),
            Box::new(runner.clone()),
        )
    }

    mod planning {
        use super::*;

        #[test]
        fn every_pair_has_an_action() {
            use DivergenceState::*;
            use ResolutionChoice::*;

            let cases = [
                (UpToDate, None, Resolution::NoOp),
                (LocalAhead, None, Resolution::Push),
                (NoUpstream, None, Resolution::PushSetUpstream),
                (RemoteAhead, Some(RemoteWins), Resolution::HardReset),
                (RemoteAhead, Some(LocalWins), Resolution::ForcePushWithLease),
                (RemoteAhead, Some(Abort), Resolution::Abort),
                (Diverged, Some(RemoteWins), Resolution::HardReset),
                (Diverged, Some(LocalWins), Resolution::ForcePushWithLease),
                (Diverged, Some(Abort), Resolution::Abort),
            ];
            for (state, choice, expected) in cases {
                assert_eq!(Resolution::plan(state, choice), Ok(expected), "{state} {choice:?}");
            }
        }

        #[test]
        fn conflict_without_choice_is_error() {
            assert_eq!(
                Resolution::plan(DivergenceState::Diverged, None),
                Err(PlanError::ChoiceRequired {
                    state: DivergenceState::Diverged
                })
            );
        }

        #[test]
        fn choice_ignored_when_not_needed() {
            assert_eq!(
                Resolution::plan(DivergenceState::LocalAhead, Some(ResolutionChoice::RemoteWins)),
                Ok(Resolution::Push)
            );
        }

        #[test]
        fn lease_names_observed_tip() {
            let oid = Oid::new(REMOTE_TIP).unwrap();
            let cmd = Resolution::ForcePushWithLease.command(&main(), Some(&oid)).unwrap();
            assert_eq!(
                cmd.to_string(),
                format!("git push --force-with-lease=main:{REMOTE_TIP} origin main")
            );
        }

        #[test]
        fn lease_without_tip_uses_tracking_ref() {
            let cmd = Resolution::ForcePushWithLease.command(&main(), None).unwrap();
            assert_eq!(cmd.to_string(), "git push --force-with-lease=main origin main");
        }
    }

    mod outcomes {
        use super::*;

        #[test]
        fn display_strings() {
            let b = main();
            assert_eq!(SyncOutcome::NothingToSync.to_string(), "Already up to date; nothing to sync.");
            assert_eq!(SyncOutcome::Pushed { branch: b.clone() }.to_string(), "Pushed updates to origin/main");
            assert_eq!(
                SyncOutcome::PushedSetUpstream { branch: b.clone() }.to_string(),
                "Pushed and set upstream to origin/main"
            );
            assert_eq!(
                SyncOutcome::ReplacedLocal { branch: b.clone() }.to_string(),
                "Replaced local DB with origin/main version"
            );
            assert_eq!(
                SyncOutcome::ForcePushed { branch: b }.to_string(),
                "Force-pushed local DB to origin/main"
            );
            assert_eq!(SyncOutcome::Aborted.to_string(), "Sync aborted; nothing was changed.");
        }
    }

    mod execution {
        use super::*;

        #[test]
        fn dry_run_runs_nothing_for_any_resolution() {
            let all = [
                (Resolution::NoOp, DivergenceState::UpToDate),
                (Resolution::Push, DivergenceState::LocalAhead),
                (Resolution::PushSetUpstream, DivergenceState::NoUpstream),
                (Resolution::HardReset, DivergenceState::RemoteAhead),
                (Resolution::ForcePushWithLease, DivergenceState::Diverged),
                (Resolution::Abort, DivergenceState::Diverged),
            ];
            for (resolution, state) in all {
                let runner = ScriptedRunner::new();
                let outcome = execute(&git(&runner), resolution, &snapshot(state), true).unwrap();
                assert!(runner.invocations().is_empty(), "{resolution:?} ran {:?}", runner.commands());
                assert!(
                    matches!(
                        outcome,
                        SyncOutcome::DryRun { .. } | SyncOutcome::NothingToSync | SyncOutcome::Aborted
                    ),
                    "{outcome:?}"
                );
            }
        }

        #[test]
        fn dry_run_reports_the_command() {
            let runner = ScriptedRunner::new();
            let outcome = execute(
                &git(&runner),
                Resolution::HardReset,
                &snapshot(DivergenceState::RemoteAhead),
                true,
            )
            .unwrap();
            assert_eq!(
                outcome.to_string(),
                "Dry-run: would replace local DB with origin/main version ('git reset --hard origin/main')"
            );
        }

        #[test]
        fn push_set_upstream() {
            let runner = ScriptedRunner::new();
            runner.respond(&["push", "-u"], ProcessOutput::ok(""));

            let outcome = execute(
                &git(&runner),
                Resolution::PushSetUpstream,
                &snapshot(DivergenceState::NoUpstream),
                false,
            )
            .unwrap();

            assert_eq!(outcome, SyncOutcome::PushedSetUpstream { branch: main() });
            assert_eq!(runner.commands(), vec!["git push -u origin main"]);
        }

        #[test]
        fn local_wins_leases_observed_tip() {
            let runner = ScriptedRunner::new();
            runner.respond(&["push"], ProcessOutput::ok(""));

            let outcome = execute(
                &git(&runner),
                Resolution::ForcePushWithLease,
                &snapshot(DivergenceState::Diverged),
                false,
            )
            .unwrap();

            assert_eq!(outcome, SyncOutcome::ForcePushed { branch: main() });
            assert_eq!(
                runner.commands(),
                vec![format!("git push --force-with-lease=main:{REMOTE_TIP} origin main")]
            );
        }

        #[test]
        fn rejected_plain_push_is_concurrent_modification() {
            let runner = ScriptedRunner::new();
            runner.respond(
                &["push"],
                ProcessOutput::failed(1, " ! [rejected]        main -> main (non-fast-forward)"),
            );

            let err = execute(
                &git(&runner),
                Resolution::Push,
                &snapshot(DivergenceState::LocalAhead),
                false,
            )
            .unwrap_err();

            assert!(matches!(err, GitSyncError::ConcurrentModification { .. }));
        }

        #[test]
        fn remote_wins_resets() {
            let runner = ScriptedRunner::new();
            runner.respond(&["reset", "--hard"], ProcessOutput::ok("HEAD is now at 2222222\n"));

            let outcome = execute(
                &git(&runner),
                Resolution::HardReset,
                &snapshot(DivergenceState::RemoteAhead),
                false,
            )
            .unwrap();

            assert_eq!(outcome, SyncOutcome::ReplacedLocal { branch: main() });
            assert!(!runner.ran(&["push"]));
        }

        #[test]
        fn abort_touches_nothing() {
            let runner = ScriptedRunner::new();
            let outcome = execute(
                &git(&runner),
                Resolution::Abort,
                &snapshot(DivergenceState::Diverged),
                false,
            )
            .unwrap();
            assert_eq!(outcome, SyncOutcome::Aborted);
            assert!(runner.invocations().is_empty());
        }
    }
}
