//! engine
//!
//! Orchestrates a sync: clean_check -> fetch -> classify -> resolve/report.
//!
//! # Architecture
//!
//! The engine is the only caller of the destructive git primitives. It
//! reads repository state through [`crate::git::Git`], decides what to do
//! with a pure planner ([`resolve::Resolution::plan`]), and executes the
//! result once. Nothing is retried and nothing is guessed: conflicts need
//! an explicit choice from an injected [`crate::ui::prompts::Prompter`].
//!
//! # Invariants
//!
//! - A dirty worktree stops the sync before any network access
//! - Fetch always precedes classification, classification precedes resolution
//! - Dry runs execute no mutating command in any state
//!
//! # Example
//!
//! ```ignore
//! use terminotes::engine::sync::Synchronizer;
//! use terminotes::ui::prompts::TerminalPrompter;
//!
//! let outcome = Synchronizer::new(&git, false).run(&mut TerminalPrompter::stdio())?;
//! println!("{outcome}");
//! ```

pub mod resolve;
pub mod sync;

pub use resolve::{execute, PlanError, Resolution, SyncOutcome};
pub use sync::{SyncPhase, Synchronizer};

use std::path::PathBuf;

use crate::ui::output::Verbosity;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone)]
pub struct Context {
    /// Config file override (`--config`).
    pub config_path: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (errors only).
    pub quiet: bool,
    /// Whether conflicts may be resolved by prompting.
    pub interactive: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            config_path: None,
            debug: false,
            quiet: false,
            interactive: true,
        }
    }
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}
