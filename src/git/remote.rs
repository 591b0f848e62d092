//! git::remote
//!
//! Remote state analysis: fetch, then classify local vs. upstream history.
//!
//! No merge is ever attempted. The tracked artifact is a binary file, so
//! the only question is which side has commits the other lacks.

use serde::Serialize;

use super::error::GitSyncError;
use super::repo::{Git, REMOTE_NAME};
use super::runner::GitCommand;
use crate::core::types::{BranchName, DivergenceState, Oid};

/// The remote branch the current branch tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Upstream {
    pub remote: String,
    pub branch: BranchName,
}

impl Upstream {
    /// Parse the `<remote>/<branch>` form printed by `rev-parse --abbrev-ref`.
    fn parse(s: &str) -> Option<Self> {
        let (remote, branch) = s.trim().split_once('/')?;
        if remote.is_empty() {
            return None;
        }
        Some(Self {
            remote: remote.to_string(),
            branch: BranchName::new(branch).ok()?,
        })
    }

    /// Short form, e.g. `origin/main`.
    pub fn short_name(&self) -> String {
        format!("{}/{}", self.remote, self.branch)
    }

    /// Full remote-tracking ref, e.g. `refs/remotes/origin/main`.
    pub fn tracking_ref(&self) -> String {
        format!("refs/remotes/{}/{}", self.remote, self.branch)
    }
}

impl std::fmt::Display for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.remote, self.branch)
    }
}

/// Ref positions observed after a fetch, with their classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteSnapshot {
    pub branch: BranchName,
    pub upstream: Option<Upstream>,
    /// Commits reachable only from the local branch.
    pub ahead: u64,
    /// Commits reachable only from the upstream.
    pub behind: u64,
    /// Local tip; `None` for a branch with no commits yet.
    pub local_oid: Option<Oid>,
    /// Upstream tip as of the last fetch; set exactly when `upstream` is.
    pub remote_oid: Option<Oid>,
    pub state: DivergenceState,
}

impl Git {
    /// Update remote-tracking refs and drop refs to deleted remote branches.
    ///
    /// # Errors
    ///
    /// [`GitSyncError::Connectivity`] if the remote cannot be reached.
    pub fn fetch_prune(&self) -> Result<(), GitSyncError> {
        let cmd = GitCommand::new(["fetch", "--prune", REMOTE_NAME]);
        tracing::info!(command = %cmd, "fetching remote state");
        let out = self.exec(&cmd)?;
        if !out.success() {
            return Err(GitSyncError::connectivity(&cmd, &out));
        }
        Ok(())
    }

    /// Name of the checked-out branch. Works on a branch with no commits.
    ///
    /// # Errors
    ///
    /// [`GitSyncError::DetachedHead`] if HEAD is not a branch.
    pub fn current_branch(&self) -> Result<BranchName, GitSyncError> {
        let cmd = GitCommand::new(["symbolic-ref", "--short", "-q", "HEAD"]);
        let out = self.exec(&cmd)?;
        match out.code {
            Some(0) => BranchName::new(out.stdout_trimmed())
                .map_err(|_| GitSyncError::unexpected(&cmd, &out.stdout)),
            Some(1) => Err(GitSyncError::DetachedHead {
                path: self.path().to_path_buf(),
            }),
            _ => Err(GitSyncError::command_failed(&cmd, &out)),
        }
    }

    /// The branch the current branch tracks, if any.
    ///
    /// A tracking configuration whose remote branch was pruned counts as
    /// no upstream.
    pub fn upstream(&self) -> Result<Option<Upstream>, GitSyncError> {
        let cmd = GitCommand::new(["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{upstream}"]);
        let out = self.exec(&cmd)?;
        if !out.success() {
            return Ok(None);
        }
        Upstream::parse(out.stdout_trimmed())
            .map(Some)
            .ok_or_else(|| GitSyncError::unexpected(&cmd, &out.stdout))
    }

    /// Commits only on the local side and only on the upstream side.
    pub fn ahead_behind(&self) -> Result<(u64, u64), GitSyncError> {
        let cmd = GitCommand::new(["rev-list", "--left-right", "--count", "HEAD...@{upstream}"]);
        let out = self.run_checked(&cmd)?;
        parse_counts(&out.stdout).ok_or_else(|| GitSyncError::unexpected(&cmd, &out.stdout))
    }

    /// Resolve `rev` to a commit, or `None` if it does not exist.
    pub fn resolve(&self, rev: &str) -> Result<Option<Oid>, GitSyncError> {
        let cmd = GitCommand::new(["rev-parse", "--verify", "-q", rev]);
        let out = self.exec(&cmd)?;
        match out.code {
            Some(0) => Oid::new(out.stdout_trimmed())
                .map(Some)
                .map_err(|_| GitSyncError::unexpected(&cmd, &out.stdout)),
            Some(1) => Ok(None),
            _ => Err(GitSyncError::command_failed(&cmd, &out)),
        }
    }

    /// Whether HEAD points at a commit (false on a freshly cloned empty remote).
    pub fn has_commits(&self) -> Result<bool, GitSyncError> {
        Ok(self.resolve("HEAD")?.is_some())
    }

    /// Classify the current branch against its upstream.
    ///
    /// Reads local refs only; call [`Git::fetch_prune`] first for a fresh view.
    pub fn detect_divergence(&self) -> Result<DivergenceState, GitSyncError> {
        Ok(self.remote_snapshot()?.state)
    }

    /// Capture branch, upstream and ahead/behind counts in one pass.
    ///
    /// # Errors
    ///
    /// [`GitSyncError::UpstreamMismatch`] if the branch tracks anything but
    /// `origin/<branch>`.
    pub fn remote_snapshot(&self) -> Result<RemoteSnapshot, GitSyncError> {
        let branch = self.current_branch()?;
        let local_oid = self.resolve("HEAD")?;

        // A tracking ref that no longer resolves was pruned; treat as untracked.
        let mut upstream = None;
        let mut remote_oid = None;
        if let Some(up) = self.upstream()? {
            // Resolutions act on origin/<branch>, so classify against nothing else.
            if up.remote != REMOTE_NAME || up.branch != branch {
                return Err(GitSyncError::UpstreamMismatch {
                    branch: branch.to_string(),
                    upstream: up.short_name(),
                });
            }
            if let Some(oid) = self.resolve(&up.tracking_ref())? {
                upstream = Some(up);
                remote_oid = Some(oid);
            }
        }

        let (ahead, behind) = match (&upstream, &local_oid) {
            (Some(_), Some(_)) => self.ahead_behind()?,
            _ => (0, 0),
        };

        let state = DivergenceState::classify(ahead, behind, upstream.is_some());
        tracing::debug!(%branch, ahead, behind, %state, "classified divergence");
        Ok(RemoteSnapshot {
            branch,
            upstream,
            ahead,
            behind,
            local_oid,
            remote_oid,
            state,
        })
    }
}

/// `git push origin <b>`: fast-forward only.
pub fn push_command(branch: &BranchName) -> GitCommand {
    GitCommand::new(["push", REMOTE_NAME, branch.as_str()])
}

/// `git push -u origin <b>`: first push, records tracking.
pub fn push_set_upstream_command(branch: &BranchName) -> GitCommand {
    GitCommand::new(["push", "-u", REMOTE_NAME, branch.as_str()])
}

/// `git reset --hard origin/<b>`: local branch and worktree become the remote tip.
pub fn hard_reset_command(branch: &BranchName) -> GitCommand {
    GitCommand::new(["reset", "--hard"]).arg(format!("{REMOTE_NAME}/{branch}"))
}

/// `git push --force-with-lease=<b>:<oid> origin <b>`.
///
/// The lease names the remote tip observed at fetch time, so the push is
/// rejected if anyone pushed since.
pub fn force_push_with_lease_command(branch: &BranchName, expected: &Oid) -> GitCommand {
    GitCommand::new(["push"])
        .arg(format!("--force-with-lease={branch}:{expected}"))
        .arg(REMOTE_NAME)
        .arg(branch.as_str())
}

impl Git {
    /// Run a push, classifying rejections as concurrent modification.
    pub fn run_push(&self, cmd: &GitCommand) -> Result<(), GitSyncError> {
        tracing::info!(command = %cmd, "pushing");
        let out = self.exec(cmd)?;
        if !out.success() {
            return Err(GitSyncError::push_failed(cmd, &out));
        }
        Ok(())
    }

    pub fn push(&self, branch: &BranchName) -> Result<(), GitSyncError> {
        self.run_push(&push_command(branch))
    }

    pub fn push_set_upstream(&self, branch: &BranchName) -> Result<(), GitSyncError> {
        self.run_push(&push_set_upstream_command(branch))
    }

    /// Overwrite the remote branch, but only if it still points at `expected`.
    ///
    /// # Errors
    ///
    /// [`GitSyncError::ConcurrentModification`] if the lease is stale. The
    /// remote is untouched in that case.
    pub fn force_push_with_lease(&self, branch: &BranchName, expected: &Oid) -> Result<(), GitSyncError> {
        self.run_push(&force_push_with_lease_command(branch, expected))
    }

    /// Discard local commits and worktree changes in favour of the remote tip.
    pub fn hard_reset_to_remote(&self, branch: &BranchName) -> Result<(), GitSyncError> {
        let cmd = hard_reset_command(branch);
        tracing::info!(command = %cmd, "resetting to remote");
        self.run_checked(&cmd)?;
        Ok(())
    }
}

/// Parse `rev-list --left-right --count` output (`<ahead>\t<behind>`).
fn parse_counts(s: &str) -> Option<(u64, u64)> {
    let mut parts = s.split_whitespace();
    let ahead = parts.next()?.parse().ok()?;
    let behind = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((ahead, behind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::mock::ScriptedRunner;
    use crate::git::repo::RepositoryHandle;
    use crate::git::runner::ProcessOutput;

    const LOCAL: &str = "1111111111111111111111111111111111111111\n";
    const REMOTE: &str = "2222222222222222222222222222222222222222\n";

    fn git(runner: &ScriptedRunner) -> Git {
        Git::new(
            RepositoryHandle::new("/data/notes", "git@example.com:me/notes.git"),
            Box::new(runner.clone()),
        )
    }

    fn tracked(runner: &ScriptedRunner, counts: &str) {
        runner.always(&["symbolic-ref"], ProcessOutput::ok("main\n"));
        runner.always(&["rev-parse", "--abbrev-ref"], ProcessOutput::ok("origin/main\n"));
        runner.always(&["rev-list"], ProcessOutput::ok(counts));
        runner.always(&["rev-parse", "--verify", "-q", "HEAD"], ProcessOutput::ok(LOCAL));
        runner.always(
            &["rev-parse", "--verify", "-q", "refs/remotes/origin/main"],
            ProcessOutput::ok(REMOTE),
        );
    }

    #[test]
    fn parse_counts_accepts_tab_separated() {
        assert_eq!(parse_counts("3\t1\n"), Some((3, 1)));
        assert_eq!(parse_counts("0 0"), Some((0, 0)));
        assert_eq!(parse_counts("3"), None);
        assert_eq!(parse_counts("a\tb"), None);
        assert_eq!(parse_counts("1\t2\t3"), None);
    }

    #[test]
    fn upstream_parse() {
        let up = Upstream::parse("origin/notes/laptop\n").unwrap();
        assert_eq!(up.remote, "origin");
        assert_eq!(up.branch.as_str(), "notes/laptop");
        assert_eq!(up.tracking_ref(), "refs/remotes/origin/notes/laptop");
        assert_eq!(up.short_name(), "origin/notes/laptop");
        assert!(Upstream::parse("main").is_none());
    }

    #[test]
    fn fetch_failure_is_connectivity() {
        let runner = ScriptedRunner::new();
        runner.respond(&["fetch"], ProcessOutput::failed(128, "fatal: unable to access remote"));
        let err = git(&runner).fetch_prune().unwrap_err();
        assert!(matches!(err, GitSyncError::Connectivity { .. }));
        assert_eq!(runner.commands(), vec!["git fetch --prune origin"]);
    }

    #[test]
    fn detached_head() {
        let runner = ScriptedRunner::new();
        runner.respond(&["symbolic-ref"], ProcessOutput::failed(1, ""));
        let err = git(&runner).current_branch().unwrap_err();
        assert!(matches!(err, GitSyncError::DetachedHead { .. }));
    }

    #[test]
    fn no_upstream_skips_counting() {
        let runner = ScriptedRunner::new();
        runner.always(&["symbolic-ref"], ProcessOutput::ok("main\n"));
        runner.always(
            &["rev-parse", "--abbrev-ref"],
            ProcessOutput::failed(128, "fatal: no upstream configured for branch 'main'"),
        );
        runner.always(&["rev-parse", "--verify"], ProcessOutput::ok(LOCAL));

        let snapshot = git(&runner).remote_snapshot().unwrap();

        assert_eq!(snapshot.state, DivergenceState::NoUpstream);
        assert_eq!(snapshot.upstream, None);
        assert!(!runner.ran(&["rev-list"]));
    }

    #[test]
    fn pruned_tracking_ref_reads_as_no_upstream() {
        let runner = ScriptedRunner::new();
        runner.always(&["symbolic-ref"], ProcessOutput::ok("main\n"));
        runner.always(&["rev-parse", "--abbrev-ref"], ProcessOutput::ok("origin/main\n"));
        runner.always(&["rev-parse", "--verify", "-q", "HEAD"], ProcessOutput::ok(LOCAL));
        runner.always(
            &["rev-parse", "--verify", "-q", "refs/remotes/origin/main"],
            ProcessOutput::failed(1, ""),
        );

        let snapshot = git(&runner).remote_snapshot().unwrap();

        assert_eq!(snapshot.state, DivergenceState::NoUpstream);
        assert_eq!(snapshot.remote_oid, None);
        assert!(!runner.ran(&["rev-list"]));
    }

    #[test]
    fn foreign_upstream_is_rejected() {
        for tracked_as in ["origin/notes\n", "backup/main\n"] {
            let runner = ScriptedRunner::new();
            tracked(&runner, "0\t1\n");
            runner.always(&["rev-parse", "--abbrev-ref"], ProcessOutput::ok(tracked_as));

            let err = git(&runner).remote_snapshot().unwrap_err();

            assert!(matches!(err, GitSyncError::UpstreamMismatch { .. }), "{tracked_as:?}");
            assert_eq!(err.kind(), crate::git::ErrorKind::Configuration);
            assert!(err.to_string().contains(tracked_as.trim()));
            assert!(!runner.ran(&["rev-list"]));
        }
    }

    #[test]
    fn classifies_each_state() {
        let cases = [
            ("0\t0\n", DivergenceState::UpToDate),
            ("2\t0\n", DivergenceState::LocalAhead),
            ("0\t5\n", DivergenceState::RemoteAhead),
            ("1\t1\n", DivergenceState::Diverged),
        ];
        for (counts, expected) in cases {
            let runner = ScriptedRunner::new();
            tracked(&runner, counts);
            assert_eq!(git(&runner).detect_divergence().unwrap(), expected, "counts {counts:?}");
        }
    }

    #[test]
    fn snapshot_captures_tips() {
        let runner = ScriptedRunner::new();
        tracked(&runner, "1\t2\n");

        let snapshot = git(&runner).remote_snapshot().unwrap();

        assert_eq!(snapshot.branch.as_str(), "main");
        assert_eq!((snapshot.ahead, snapshot.behind), (1, 2));
        assert_eq!(snapshot.local_oid.unwrap().as_str(), LOCAL.trim());
        assert_eq!(snapshot.remote_oid.unwrap().as_str(), REMOTE.trim());
    }

    fn main() -> BranchName {
        BranchName::new("main").unwrap()
    }

    #[test]
    fn resolution_commands_render_literally() {
        let oid = Oid::new(REMOTE.trim()).unwrap();
        assert_eq!(push_command(&main()).to_string(), "git push origin main");
        assert_eq!(push_set_upstream_command(&main()).to_string(), "git push -u origin main");
        assert_eq!(hard_reset_command(&main()).to_string(), "git reset --hard origin/main");
        assert_eq!(
            force_push_with_lease_command(&main(), &oid).to_string(),
            format!("git push --force-with-lease=main:{} origin main", REMOTE.trim())
        );
    }

    #[test]
    fn stale_lease_is_concurrent_modification() {
        let runner = ScriptedRunner::new();
        runner.respond(
            &["push"],
            ProcessOutput::failed(1, " ! [rejected]        main -> main (stale info)\n"),
        );
        let oid = Oid::new(REMOTE.trim()).unwrap();

        let err = git(&runner).force_push_with_lease(&main(), &oid).unwrap_err();

        assert!(matches!(err, GitSyncError::ConcurrentModification { .. }));
    }

    #[test]
    fn failed_reset_carries_stderr() {
        let runner = ScriptedRunner::new();
        runner.respond(&["reset"], ProcessOutput::failed(128, "fatal: ambiguous argument 'origin/main'"));

        let err = git(&runner).hard_reset_to_remote(&main()).unwrap_err();

        assert!(err.to_string().contains("ambiguous argument"));
        assert!(err.to_string().contains("git reset --hard origin/main"));
    }

    #[test]
    fn unborn_branch_has_no_local_oid() {
        let runner = ScriptedRunner::new();
        runner.always(&["symbolic-ref"], ProcessOutput::ok("main\n"));
        runner.always(&["rev-parse", "--abbrev-ref"], ProcessOutput::failed(128, ""));
        runner.always(&["rev-parse", "--verify"], ProcessOutput::failed(1, ""));

        let snapshot = git(&runner).remote_snapshot().unwrap();
        assert_eq!(snapshot.local_oid, None);
        assert_eq!(snapshot.state, DivergenceState::NoUpstream);
        assert!(!git(&runner).has_commits().unwrap());
    }
}
