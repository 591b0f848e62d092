//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads configuration and validates command-specific arguments
//! 2. Calls the engine or the git layer
//! 3. Formats and displays output
//!
//! Handlers do NOT run git themselves; everything goes through
//! [`crate::git::Git`].

mod completion;
mod config_cmd;
mod info;
mod record;
mod sync;

pub use completion::completion;
pub use config_cmd::{init as config_init, path as config_path, show as config_show};
pub use info::info;
pub use record::record;
pub use sync::sync;

use crate::cli::args::{Command, ConfigAction};
use crate::core::config::Config;
use crate::engine::Context;
use crate::git::{Git, RepositoryHandle};
use anyhow::{Context as _, Result};

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Sync { dry_run } => sync::sync(ctx, dry_run),
        Command::Record { action, note_id } => record::record(ctx, action, note_id),
        Command::Info { json } => info::info(ctx, json),
        Command::Config { action } => match action {
            ConfigAction::Init {
                remote_url,
                dir,
                editor,
                force,
            } => config_cmd::init(ctx, &remote_url, dir, editor, force),
            ConfigAction::Show => config_cmd::show(ctx),
            ConfigAction::Path => config_cmd::path(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Load the config for this invocation.
fn load_config(ctx: &Context) -> Result<Config> {
    Config::load(ctx.config_path.as_deref()).context("failed to load configuration")
}

/// Git interface for the configured clone.
fn open_git(config: &Config) -> Result<Git> {
    let dir = config
        .notes_dir()
        .context("failed to resolve the notes directory")?;
    Ok(Git::system(RepositoryHandle::new(dir, config.remote_url())))
}
