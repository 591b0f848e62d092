//! record command - Commit the database after a note change
//!
//! The storage layer (or a script wrapping it) calls this right after a
//! successful mutation. The commit is local only. If it fails the change
//! is still on disk, so the failure is a warning and the exit code is 0.

use crate::cli::args::RecordAction;
use crate::core::types::{DbMutation, NoteAction};
use crate::engine::Context;
use crate::git::record_mutation;
use crate::ui::output;
use anyhow::{bail, Context as _, Result};

/// Record one database mutation as a commit.
pub fn record(ctx: &Context, action: RecordAction, note_id: Option<u64>) -> Result<()> {
    let verbosity = ctx.verbosity();
    let mutation = mutation_for(action.into(), note_id)?;

    let config = super::load_config(ctx)?;
    let git = super::open_git(&config)?;
    let storage = config
        .database()
        .context("failed to resolve the database path")?;

    match record_mutation(&git, &storage, &mutation) {
        Some(warning) => output::warn(warning, verbosity),
        None => output::debug(format!("recorded '{}'", mutation.commit_message()), verbosity),
    }
    Ok(())
}

fn mutation_for(action: NoteAction, note_id: Option<u64>) -> Result<DbMutation> {
    match (action, note_id) {
        (NoteAction::Prune, None) => Ok(DbMutation::prune()),
        (NoteAction::Prune, Some(_)) => bail!("prune does not take a note id"),
        (action, Some(id)) => Ok(DbMutation::note(action, id)),
        (_, None) => bail!("a NOTE_ID is required for this action"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_actions_need_an_id() {
        assert!(mutation_for(NoteAction::Create, None).is_err());
        assert_eq!(
            mutation_for(NoteAction::Delete, Some(3)).unwrap().commit_message(),
            "chore(db): delete note 3"
        );
    }

    #[test]
    fn prune_takes_no_id() {
        assert!(mutation_for(NoteAction::Prune, Some(1)).is_err());
        assert_eq!(mutation_for(NoteAction::Prune, None).unwrap(), DbMutation::prune());
    }
}
