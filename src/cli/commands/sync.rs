//! cli::commands::sync
//!
//! Synchronize the notes clone with its remote.
//!
//! # Design
//!
//! - Ensures the clone exists (cloning on first run), then hands over to
//!   [`Synchronizer`]
//! - The prompt is a [`TerminalPrompter`] only in interactive sessions;
//!   otherwise conflicts fail with guidance
//! - An aborted resolution is a normal outcome and exits 0
//!
//! # Example
//!
//! ```bash
//! # Sync with remote
//! tn sync
//!
//! # Show what would run
//! tn sync --dry-run
//! ```

use crate::engine::sync::Synchronizer;
use crate::engine::{Context, SyncOutcome};
use crate::git::CloneStatus;
use crate::ui::output;
use crate::ui::prompts::{NonInteractivePrompter, TerminalPrompter};
use anyhow::Result;

/// Run the sync command.
pub fn sync(ctx: &Context, dry_run: bool) -> Result<()> {
    let verbosity = ctx.verbosity();
    let config = super::load_config(ctx)?;
    let git = super::open_git(&config)?;

    if dry_run && !git.path().exists() {
        let outcome = SyncOutcome::DryRun {
            action: format!("clone {} into {}", config.remote_url(), git.path().display()),
            command: git.clone_command().to_string(),
        };
        output::print(outcome, verbosity);
        return Ok(());
    }

    if git.ensure_local_clone()? == CloneStatus::Cloned {
        output::print(
            format!("Cloned {} into {}", config.remote_url(), git.path().display()),
            verbosity,
        );
    }

    let mut synchronizer = Synchronizer::new(&git, dry_run);
    let outcome = if ctx.interactive {
        synchronizer.run(&mut TerminalPrompter::stdio())?
    } else {
        synchronizer.run(&mut NonInteractivePrompter)?
    };

    output::debug(
        format!(
            "phases: {}",
            synchronizer
                .phases()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" -> ")
        ),
        verbosity,
    );
    output::success(outcome, verbosity);
    Ok(())
}
