//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`BranchName`] - Branch name reported by git, safe to pass as an argument
//! - [`Oid`] - Git object identifier (SHA)
//! - [`DivergenceState`] - How local history relates to its upstream
//! - [`ResolutionChoice`] - The user's answer to an irreconcilable divergence
//! - [`DbMutation`] - A storage change, rendered as a commit message
//!
//! # Examples
//!
//! ```
//! use terminotes::core::types::{BranchName, DbMutation, NoteAction};
//!
//! let branch = BranchName::new("main").unwrap();
//! assert_eq!(branch.as_str(), "main");
//! assert!(BranchName::new("--force").is_err());
//!
//! let mutation = DbMutation::note(NoteAction::Create, 12);
//! assert_eq!(mutation.commit_message(), "chore(db): create note 12");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("unknown resolution '{0}', expected one of: local-wins, remote-wins, abort")]
    InvalidChoice(String),
}

/// A branch name as reported by git.
///
/// Branch names end up as positional arguments of `git push` and
/// `git reset`, so a name that git itself could never produce (empty,
/// leading `-`, whitespace, control characters, `..`) is rejected here.
///
/// # Example
///
/// ```
/// use terminotes::core::types::BranchName;
///
/// assert!(BranchName::new("notes/laptop").is_ok());
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("has space").is_err());
/// assert!(BranchName::new("bad..name").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name could not have
    /// come from git.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot be empty".into(),
            ));
        }
        if name.starts_with('-') {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot start with '-'".into(),
            ));
        }
        if name.contains("..") {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot contain '..'".into(),
            ));
        }
        if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot contain whitespace or control characters".into(),
            ));
        }
        Ok(())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Git object identifier (SHA-1 or SHA-256), normalized to lowercase.
///
/// # Example
///
/// ```
/// use terminotes::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new OID from a hex string.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` unless the string is 40 or 64 hex digits.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().trim().to_lowercase();
        let valid_len = oid.len() == 40 || oid.len() == 64;
        if !valid_len || !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(oid));
        }
        Ok(Self(oid))
    }

    /// Get the OID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relationship between the current branch and its upstream.
///
/// Computed fresh on every sync from the ref positions observed right after
/// `fetch --prune`; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivergenceState {
    /// Local and upstream point at the same commit.
    UpToDate,
    /// Local has commits the upstream lacks; upstream has nothing new.
    LocalAhead,
    /// Upstream has commits local lacks; local has nothing new.
    RemoteAhead,
    /// Both sides have commits the other lacks.
    Diverged,
    /// The current branch tracks nothing.
    NoUpstream,
}

impl DivergenceState {
    /// Classify ahead/behind counts.
    ///
    /// Without an upstream the counts are meaningless and ignored.
    ///
    /// ```
    /// use terminotes::core::types::DivergenceState;
    ///
    /// assert_eq!(DivergenceState::classify(0, 0, true), DivergenceState::UpToDate);
    /// assert_eq!(DivergenceState::classify(2, 1, true), DivergenceState::Diverged);
    /// assert_eq!(DivergenceState::classify(2, 1, false), DivergenceState::NoUpstream);
    /// ```
    pub fn classify(ahead: u64, behind: u64, has_upstream: bool) -> Self {
        if !has_upstream {
            return Self::NoUpstream;
        }
        match (ahead, behind) {
            (0, 0) => Self::UpToDate,
            (_, 0) => Self::LocalAhead,
            (0, _) => Self::RemoteAhead,
            (_, _) => Self::Diverged,
        }
    }

    /// Stable snake_case name, as used in logs and `--json` output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UpToDate => "up_to_date",
            Self::LocalAhead => "local_ahead",
            Self::RemoteAhead => "remote_ahead",
            Self::Diverged => "diverged",
            Self::NoUpstream => "no_upstream",
        }
    }
}

impl std::fmt::Display for DivergenceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer to a `remote_ahead` / `diverged` prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionChoice {
    /// Overwrite the remote with local history (forced push with lease).
    LocalWins,
    /// Replace local history with the remote tip (hard reset).
    RemoteWins,
    /// Leave everything as it is.
    Abort,
}

impl ResolutionChoice {
    /// All choices, in the order they are offered.
    pub const ALL: [ResolutionChoice; 3] = [Self::LocalWins, Self::RemoteWins, Self::Abort];

    /// The keyword the user types.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LocalWins => "local-wins",
            Self::RemoteWins => "remote-wins",
            Self::Abort => "abort",
        }
    }
}

impl std::str::FromStr for ResolutionChoice {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local-wins" | "local" => Ok(Self::LocalWins),
            "remote-wins" | "remote" => Ok(Self::RemoteWins),
            "abort" => Ok(Self::Abort),
            other => Err(TypeError::InvalidChoice(other.to_string())),
        }
    }
}

impl std::fmt::Display for ResolutionChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of change the storage layer made to the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteAction {
    Create,
    Update,
    Delete,
    /// Removal of unused tags and stale links; not tied to one note.
    Prune,
}

/// One database mutation, recorded as exactly one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbMutation {
    pub action: NoteAction,
    pub note_id: Option<u64>,
}

impl DbMutation {
    /// A mutation of a single note.
    pub fn note(action: NoteAction, note_id: u64) -> Self {
        Self {
            action,
            note_id: Some(note_id),
        }
    }

    /// A prune of unused tags.
    pub fn prune() -> Self {
        Self {
            action: NoteAction::Prune,
            note_id: None,
        }
    }

    /// Commit message: `chore(db): <action> <note-id>`.
    pub fn commit_message(&self) -> String {
        let verb = match self.action {
            NoteAction::Create => "create note",
            NoteAction::Update => "update note",
            NoteAction::Delete => "delete note",
            NoteAction::Prune => "prune unused tags",
        };
        match self.note_id {
            Some(id) => format!("chore(db): {verb} {id}"),
            None => format!("chore(db): {verb}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod branch_name {
        use super::*;

        #[test]
        fn accepts_git_names() {
            for name in ["main", "master", "notes/laptop", "user@host", "v1.2"] {
                assert!(BranchName::new(name).is_ok(), "{name} should be valid");
            }
        }

        #[test]
        fn rejects_option_like_names() {
            assert!(BranchName::new("-f").is_err());
            assert!(BranchName::new("--force").is_err());
        }

        #[test]
        fn rejects_whitespace() {
            assert!(BranchName::new("main\n").is_err());
            assert!(BranchName::new("a b").is_err());
        }

        #[test]
        fn serde_roundtrip() {
            let name = BranchName::new("main").unwrap();
            let json = serde_json::to_string(&name).unwrap();
            assert_eq!(json, "\"main\"");
            let parsed: BranchName = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, name);
        }
    }

    mod oid {
        use super::*;

        #[test]
        fn trims_and_lowercases() {
            let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345\n").unwrap();
            assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
        }

        #[test]
        fn rejects_short_and_non_hex() {
            assert!(Oid::new("abc123").is_err());
            assert!(Oid::new("z".repeat(40)).is_err());
        }
    }

    mod divergence {
        use super::*;

        #[test]
        fn classify_table() {
            assert_eq!(DivergenceState::classify(0, 0, true), DivergenceState::UpToDate);
            assert_eq!(DivergenceState::classify(3, 0, true), DivergenceState::LocalAhead);
            assert_eq!(DivergenceState::classify(0, 4, true), DivergenceState::RemoteAhead);
            assert_eq!(DivergenceState::classify(1, 1, true), DivergenceState::Diverged);
        }

        #[test]
        fn no_upstream_ignores_counts() {
            assert_eq!(DivergenceState::classify(0, 0, false), DivergenceState::NoUpstream);
            assert_eq!(DivergenceState::classify(5, 7, false), DivergenceState::NoUpstream);
        }

        #[test]
        fn json_names() {
            let json = serde_json::to_string(&DivergenceState::NoUpstream).unwrap();
            assert_eq!(json, "\"no_upstream\"");
        }
    }

    mod choice {
        use super::*;

        #[test]
        fn parses_keywords_case_insensitively() {
            assert_eq!("LOCAL-WINS".parse(), Ok(ResolutionChoice::LocalWins));
            assert_eq!(" remote-wins ".parse(), Ok(ResolutionChoice::RemoteWins));
            assert_eq!("abort".parse(), Ok(ResolutionChoice::Abort));
        }

        #[test]
        fn rejects_unknown() {
            assert!("merge".parse::<ResolutionChoice>().is_err());
        }
    }

    mod mutation {
        use super::*;

        #[test]
        fn messages() {
            assert_eq!(
                DbMutation::note(NoteAction::Update, 7).commit_message(),
                "chore(db): update note 7"
            );
            assert_eq!(
                DbMutation::note(NoteAction::Delete, 3).commit_message(),
                "chore(db): delete note 3"
            );
            assert_eq!(
                DbMutation::prune().commit_message(),
                "chore(db): prune unused tags"
            );
        }
    }
}
