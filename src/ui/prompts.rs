//! ui::prompts
//!
//! Interactive prompts for conflict resolution.
//!
//! # Design
//!
//! The sync orchestrator never reads the terminal itself. It asks a
//! [`Prompter`], which the CLI picks based on whether the session is
//! interactive. In non-interactive mode the prompter refuses with
//! [`PromptError::NotInteractive`] instead of guessing.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::core::types::{DivergenceState, ResolutionChoice};

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<io::Error> for PromptError {
    fn from(err: io::Error) -> Self {
        PromptError::IoError(err.to_string())
    }
}

/// Source of the user's resolution choice.
pub trait Prompter {
    /// Ask how to resolve a conflict in `state`.
    fn choose_resolution(&mut self, state: DivergenceState) -> Result<ResolutionChoice, PromptError>;
}

/// Choice used when the user just presses enter or input ends.
pub const DEFAULT_CHOICE: ResolutionChoice = ResolutionChoice::Abort;

/// Explanation shown before the choice.
pub fn preface(state: DivergenceState) -> &'static str {
    match state {
        DivergenceState::RemoteAhead => {
            "Remote has new commits. The notes database cannot be merged.\nChoose how to proceed."
        }
        _ => {
            "Local and remote have diverged. The notes database cannot be merged.\nChoose how to proceed."
        }
    }
}

/// Line-based prompt over any reader/writer pair.
///
/// Writes to `output` (stderr in production, so stdout stays clean for
/// the outcome line). Empty input or end of input selects `abort`.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on the process's stdin and stderr.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn choose_resolution(&mut self, state: DivergenceState) -> Result<ResolutionChoice, PromptError> {
        writeln!(self.output, "{}", preface(state))?;

        let options = ResolutionChoice::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        loop {
            write!(self.output, "Choose resolution ({options}) [{DEFAULT_CHOICE}]: ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Ok(DEFAULT_CHOICE);
            }

            let answer = line.trim().to_ascii_lowercase();
            if answer.is_empty() {
                return Ok(DEFAULT_CHOICE);
            }
            match answer.parse::<ResolutionChoice>() {
                Ok(choice) => return Ok(choice),
                Err(_) => writeln!(self.output, "Error: '{answer}' is not one of {options}.")?,
            }
        }
    }
}

/// Prompter for sessions without a terminal. Always refuses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonInteractivePrompter;

impl Prompter for NonInteractivePrompter {
    fn choose_resolution(&mut self, _state: DivergenceState) -> Result<ResolutionChoice, PromptError> {
        Err(PromptError::NotInteractive)
    }
}

/// Prompter that replays scripted answers and records what it was asked.
///
/// Running out of answers reads as the user cancelling.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<ResolutionChoice>,
    asked: Vec<DivergenceState>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = ResolutionChoice>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    /// States the prompter was asked about, in order.
    pub fn asked(&self) -> &[DivergenceState] {
        &self.asked
    }
}

impl Prompter for ScriptedPrompter {
    fn choose_resolution(&mut self, state: DivergenceState) -> Result<ResolutionChoice, PromptError> {
        self.asked.push(state);
        self.answers.pop_front().ok_or(PromptError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(input: &str, state: DivergenceState) -> (ResolutionChoice, String) {
        let mut out = Vec::new();
        let choice = TerminalPrompter::new(input.as_bytes(), &mut out)
            .choose_resolution(state)
            .unwrap();
        (choice, String::from_utf8(out).unwrap())
    }

    #[test]
    fn reads_a_choice() {
        let (choice, out) = ask("remote-wins\n", DivergenceState::Diverged);
        assert_eq!(choice, ResolutionChoice::RemoteWins);
        assert!(out.starts_with("Local and remote have diverged."));
        assert!(out.contains("local-wins, remote-wins, abort"));
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(ask("LOCAL-WINS\n", DivergenceState::RemoteAhead).0, ResolutionChoice::LocalWins);
    }

    #[test]
    fn empty_line_defaults_to_abort() {
        assert_eq!(ask("\n", DivergenceState::RemoteAhead).0, ResolutionChoice::Abort);
    }

    #[test]
    fn eof_is_abort() {
        assert_eq!(ask("", DivergenceState::Diverged).0, ResolutionChoice::Abort);
    }

    #[test]
    fn invalid_input_asks_again() {
        let (choice, out) = ask("merge\nlocal-wins\n", DivergenceState::RemoteAhead);
        assert_eq!(choice, ResolutionChoice::LocalWins);
        assert!(out.starts_with("Remote has new commits."));
        assert!(out.contains("'merge' is not one of"));
        assert_eq!(out.matches("Choose resolution").count(), 2);
    }

    #[test]
    fn non_interactive_refuses() {
        let err = NonInteractivePrompter
            .choose_resolution(DivergenceState::Diverged)
            .unwrap_err();
        assert!(matches!(err, PromptError::NotInteractive));
    }

    #[test]
    fn scripted_records_questions() {
        let mut prompter = ScriptedPrompter::new([ResolutionChoice::Abort]);
        assert_eq!(
            prompter.choose_resolution(DivergenceState::RemoteAhead).unwrap(),
            ResolutionChoice::Abort
        );
        assert!(matches!(
            prompter.choose_resolution(DivergenceState::Diverged),
            Err(PromptError::Cancelled)
        ));
        assert_eq!(
            prompter.asked(),
            &[DivergenceState::RemoteAhead, DivergenceState::Diverged]
        );
    }
}
