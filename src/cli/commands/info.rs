//! info command - Show repository and configuration info
//!
//! Read-only and offline: no fetch, so upstream state is as of the last
//! sync. Probes that fail are shown as unknown instead of failing the
//! command.

use std::path::PathBuf;

use crate::core::config::TerminotesSection;
use crate::core::storage::Storage;
use crate::engine::Context;
use crate::ui::output;
use anyhow::{Context as _, Result};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct InfoReport {
    config_path: PathBuf,
    notes_dir: PathBuf,
    database: PathBuf,
    database_exists: bool,
    repo_valid: bool,
    branch: Option<String>,
    upstream: Option<String>,
    worktree_clean: Option<bool>,
    config: TerminotesSection,
}

/// Print repository info.
pub fn info(ctx: &Context, json: bool) -> Result<()> {
    let config = super::load_config(ctx)?;
    let git = super::open_git(&config)?;
    let database = config
        .database()
        .context("failed to resolve the database path")?;

    let repo_valid = git.is_valid_repo();
    let (branch, upstream, worktree_clean) = if repo_valid {
        (
            git.current_branch().ok().map(|b| b.to_string()),
            git.upstream().ok().flatten().map(|u| u.short_name()),
            git.is_worktree_clean().ok(),
        )
    } else {
        (None, None, None)
    };

    let report = InfoReport {
        config_path: config.loaded_from().to_path_buf(),
        notes_dir: git.path().to_path_buf(),
        database: database.path().to_path_buf(),
        database_exists: database.exists(),
        repo_valid,
        branch,
        upstream,
        worktree_clean,
        config: config.section().clone(),
    };

    if json {
        output::json(&report)?;
        return Ok(());
    }

    let verbosity = ctx.verbosity();
    let yes_no = |b: bool, yes: &'static str, no: &'static str| if b { yes } else { no };
    output::print(format!("Config:     {}", report.config_path.display()), verbosity);
    output::print(
        format!(
            "Database:   {} ({})",
            report.database.display(),
            yes_no(report.database_exists, "exists", "missing")
        ),
        verbosity,
    );
    output::print(
        format!(
            "Repository: {} ({})",
            report.notes_dir.display(),
            yes_no(report.repo_valid, "valid", "not initialized or invalid")
        ),
        verbosity,
    );
    if report.repo_valid {
        output::print(
            format!("Branch:     {}", report.branch.as_deref().unwrap_or("unknown")),
            verbosity,
        );
        output::print(
            format!("Upstream:   {}", report.upstream.as_deref().unwrap_or("none")),
            verbosity,
        );
        let worktree = match report.worktree_clean {
            Some(true) => "clean",
            Some(false) => "uncommitted changes",
            None => "unknown",
        };
        output::print(format!("Worktree:   {worktree}"), verbosity);
    }
    output::print("", verbosity);
    output::print(config.to_toml()?.trim_end(), verbosity);
    Ok(())
}
