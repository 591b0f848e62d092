//! git::mock
//!
//! Scripted process runner for deterministic testing.
//!
//! # Design
//!
//! [`ScriptedRunner`] answers invocations from scripted responses keyed by
//! an argument prefix and records every invocation it sees. For a given
//! command the longest matching prefix wins; one-shot responses are
//! consumed in the order they were scripted before falling back to a
//! sticky response. Unscripted commands fail with exit code 127.
//!
//! # Example
//!
//! ```
//! use terminotes::git::mock::ScriptedRunner;
//! use terminotes::git::{GitCommand, ProcessOutput, ProcessRunner};
//!
//! let runner = ScriptedRunner::new();
//! runner.always(&["status"], ProcessOutput::ok(""));
//! runner.respond(&["push"], ProcessOutput::failed(1, "fatal: unable to access"));
//!
//! let out = runner.run(&GitCommand::new(["push", "origin", "main"]), None).unwrap();
//! assert_eq!(out.code, Some(1));
//! assert!(runner.ran(&["push"]));
//! assert!(!runner.ran(&["fetch"]));
//! ```

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::runner::{GitCommand, ProcessOutput, ProcessRunner, RunnerError, GIT_PROGRAM};

/// Exit code reported for commands nobody scripted.
pub const UNSCRIPTED_EXIT_CODE: i32 = 127;

/// Recorded invocation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: GitCommand,
    pub cwd: Option<PathBuf>,
}

/// Scripted runner for testing.
///
/// Clones share state, so a test can keep one handle while the code under
/// test owns a boxed copy.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    inner: Arc<Mutex<ScriptedRunnerInner>>,
}

#[derive(Debug, Default)]
struct ScriptedRunnerInner {
    rules: Vec<Rule>,
    invocations: Vec<Invocation>,
    binary_missing: bool,
}

#[derive(Debug)]
struct Rule {
    prefix: Vec<String>,
    queued: VecDeque<ProcessOutput>,
    sticky: Option<ProcessOutput>,
}

impl Rule {
    fn new(prefix: &[&str]) -> Self {
        Self {
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
            queued: VecDeque::new(),
            sticky: None,
        }
    }

    fn has_response(&self) -> bool {
        !self.queued.is_empty() || self.sticky.is_some()
    }

    fn next(&mut self) -> Option<ProcessOutput> {
        self.queued.pop_front().or_else(|| self.sticky.clone())
    }
}

impl ScriptedRunner {
    /// Create an empty runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every invocation fail as if `git` were not installed.
    pub fn without_binary(self) -> Self {
        self.lock().binary_missing = true;
        self
    }

    /// Queue a one-shot response for commands starting with `prefix`.
    pub fn respond(&self, prefix: &[&str], output: ProcessOutput) -> &Self {
        let mut inner = self.lock();
        inner.rule_mut(prefix).queued.push_back(output);
        drop(inner);
        self
    }

    /// Respond to every command starting with `prefix` (after queued ones).
    pub fn always(&self, prefix: &[&str], output: ProcessOutput) -> &Self {
        let mut inner = self.lock();
        inner.rule_mut(prefix).sticky = Some(output);
        drop(inner);
        self
    }

    /// All invocations so far, in order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.lock().invocations.clone()
    }

    /// Rendered commands so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.lock()
            .invocations
            .iter()
            .map(|inv| inv.command.to_string())
            .collect()
    }

    /// Number of invocations whose arguments start with `prefix`.
    pub fn count(&self, prefix: &[&str]) -> usize {
        self.lock()
            .invocations
            .iter()
            .filter(|inv| inv.command.starts_with(prefix))
            .count()
    }

    /// Whether any invocation started with `prefix`.
    pub fn ran(&self, prefix: &[&str]) -> bool {
        self.count(prefix) > 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptedRunnerInner> {
        // A poisoned lock only means another test thread panicked.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ScriptedRunnerInner {
    fn rule_mut(&mut self, prefix: &[&str]) -> &mut Rule {
        let position = self
            .rules
            .iter()
            .position(|r| r.prefix.iter().map(String::as_str).eq(prefix.iter().copied()));
        match position {
            Some(i) => &mut self.rules[i],
            None => {
                self.rules.push(Rule::new(prefix));
                let last = self.rules.len() - 1;
                &mut self.rules[last]
            }
        }
    }

    fn answer(&mut self, command: &GitCommand) -> ProcessOutput {
        let best = self
            .rules
            .iter_mut()
            .filter(|r| {
                let prefix: Vec<&str> = r.prefix.iter().map(String::as_str).collect();
                command.starts_with(&prefix) && r.has_response()
            })
            .max_by_key(|r| r.prefix.len());

        best.and_then(Rule::next).unwrap_or_else(|| {
            ProcessOutput::failed(
                UNSCRIPTED_EXIT_CODE,
                format!("scripted runner: no response for `{command}`"),
            )
        })
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, command: &GitCommand, cwd: Option<&Path>) -> Result<ProcessOutput, RunnerError> {
        let mut inner = self.lock();
        inner.invocations.push(Invocation {
            command: command.clone(),
            cwd: cwd.map(Path::to_path_buf),
        });
        if inner.binary_missing {
            return Err(RunnerError::NotFound {
                program: GIT_PROGRAM.to_string(),
            });
        }
        Ok(inner.answer(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(runner: &ScriptedRunner, args: &[&str]) -> ProcessOutput {
        runner
            .run(&GitCommand::new(args.iter().copied()), None)
            .unwrap()
    }

    #[test]
    fn queued_responses_precede_sticky() {
        let runner = ScriptedRunner::new();
        runner.always(&["status"], ProcessOutput::ok("sticky"));
        runner.respond(&["status"], ProcessOutput::ok("first"));

        assert_eq!(run(&runner, &["status"]).stdout, "first");
        assert_eq!(run(&runner, &["status"]).stdout, "sticky");
        assert_eq!(run(&runner, &["status"]).stdout, "sticky");
    }

    #[test]
    fn longest_prefix_wins() {
        let runner = ScriptedRunner::new();
        runner.always(&["push"], ProcessOutput::ok("plain"));
        runner.always(&["push", "-u"], ProcessOutput::ok("upstream"));

        assert_eq!(run(&runner, &["push", "-u", "origin", "main"]).stdout, "upstream");
        assert_eq!(run(&runner, &["push", "origin", "main"]).stdout, "plain");
    }

    #[test]
    fn exhausted_prefix_falls_back_to_shorter() {
        let runner = ScriptedRunner::new();
        runner.always(&["push"], ProcessOutput::ok("plain"));
        runner.respond(&["push", "-u"], ProcessOutput::ok("once"));

        assert_eq!(run(&runner, &["push", "-u"]).stdout, "once");
        assert_eq!(run(&runner, &["push", "-u"]).stdout, "plain");
    }

    #[test]
    fn unscripted_commands_fail() {
        let runner = ScriptedRunner::new();
        let out = run(&runner, &["gc"]);
        assert_eq!(out.code, Some(UNSCRIPTED_EXIT_CODE));
        assert!(out.stderr.contains("git gc"));
    }

    #[test]
    fn records_invocations_across_clones() {
        let runner = ScriptedRunner::new();
        let owned: Box<dyn ProcessRunner> = Box::new(runner.clone());
        owned
            .run(&GitCommand::new(["fetch", "--prune", "origin"]), Some(Path::new("/tmp")))
            .unwrap();

        let invocations = runner.invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].cwd.as_deref(), Some(Path::new("/tmp")));
        assert_eq!(runner.commands(), vec!["git fetch --prune origin"]);
    }

    #[test]
    fn missing_binary() {
        let runner = ScriptedRunner::new().without_binary();
        let err = runner.run(&GitCommand::new(["status"]), None).unwrap_err();
        assert!(matches!(err, RunnerError::NotFound { .. }));
        assert!(runner.ran(&["status"]));
    }
}
