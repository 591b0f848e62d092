//! config command - Create and inspect the configuration file

use crate::core::config::{Config, TerminotesSection};
use crate::core::paths;
use crate::engine::Context;
use crate::ui::output;
use anyhow::{Context as _, Result};

/// Write a new config file.
pub fn init(
    ctx: &Context,
    remote_url: &str,
    dir: Option<String>,
    editor: Option<String>,
    force: bool,
) -> Result<()> {
    let path = paths::config_path(ctx.config_path.as_deref())?;

    let mut section = TerminotesSection::new(remote_url);
    section.terminotes_dir = dir;
    section.editor = editor;

    Config::write(&path, &section, force)
        .with_context(|| format!("failed to create config at {}", path.display()))?;
    output::success(format!("Created configuration at {}", path.display()), ctx.verbosity());
    Ok(())
}

/// Print the loaded `[terminotes]` table.
pub fn show(ctx: &Context) -> Result<()> {
    let config = super::load_config(ctx)?;
    output::print(config.to_toml()?.trim_end(), ctx.verbosity());
    Ok(())
}

/// Print where the config file is (or would be) read from.
pub fn path(ctx: &Context) -> Result<()> {
    let path = paths::config_path(ctx.config_path.as_deref())?;
    output::print(path.display(), ctx.verbosity());
    Ok(())
}
