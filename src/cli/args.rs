//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Use this config file
//! - `--debug`: Enable debug logging
//! - `--interactive` / `--no-interactive`: Control prompts
//! - `--quiet` / `-q`: Errors only

use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::core::types::NoteAction;

/// terminotes - notes in a SQLite file, synced through git
#[derive(Parser, Debug)]
#[command(name = "tn")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Errors only; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable interactive prompts even without a terminal
    #[arg(long = "interactive", global = true, conflicts_with = "no_interactive")]
    pub interactive_flag: bool,

    /// Never prompt; conflicts that need a choice fail instead
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Returns true if:
    /// - `--interactive` was explicitly set, OR
    /// - Neither `--no-interactive` nor `--quiet` was set AND stdin is a TTY
    pub fn interactive(&self) -> bool {
        self.interactive_with_tty(std::io::stdin().is_terminal())
    }

    fn interactive_with_tty(&self, stdin_is_tty: bool) -> bool {
        if self.interactive_flag {
            true
        } else if self.no_interactive || self.quiet {
            false
        } else {
            stdin_is_tty
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Synchronize the notes repository with its remote
    #[command(
        name = "sync",
        long_about = "Synchronize the local notes repository with the remote.\n\n\
            Fetches the remote, compares local and remote history, and reconciles them. \
            The notes database is a binary file and is never merged: when both sides \
            changed you choose which one wins.",
        after_help = "\
WHAT HAPPENS:
    up to date        nothing
    local ahead       git push origin <branch>
    no upstream       git push -u origin <branch>
    remote ahead      prompt: local-wins | remote-wins | abort
    diverged          prompt: local-wins | remote-wins | abort

    remote-wins  discards unpushed local commits (git reset --hard)
    local-wins   overwrites remote commits (git push --force-with-lease)

EXAMPLES:
    # See what would happen
    tn sync --dry-run

    # Fail instead of prompting (scripts, cron)
    tn sync --no-interactive"
    )]
    Sync {
        /// Show actions without executing
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Record a database change as a local commit
    #[command(
        name = "record",
        long_about = "Commit the notes database after a change.\n\n\
            Stages only the database file and commits it with a message describing \
            the change. Never touches the network. A failed commit is reported as a \
            warning; the change itself is already saved."
    )]
    Record {
        /// What changed
        #[arg(value_enum)]
        action: RecordAction,

        /// Note id (required for create, update and delete)
        note_id: Option<u64>,
    },

    /// Show repository and configuration info
    Info {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(after_help = "\
EXAMPLES:
    # Bash
    tn completion bash > ~/.local/share/bash-completion/completions/tn

    # Zsh
    tn completion zsh > ~/.zfunc/_tn

    # Fish
    tn completion fish > ~/.config/fish/completions/tn.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Database change kinds for `tn record`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAction {
    Create,
    Update,
    Delete,
    /// Unused tags were pruned
    Prune,
}

impl From<RecordAction> for NoteAction {
    fn from(action: RecordAction) -> Self {
        match action {
            RecordAction::Create => NoteAction::Create,
            RecordAction::Update => NoteAction::Update,
            RecordAction::Delete => NoteAction::Delete,
            RecordAction::Prune => NoteAction::Prune,
        }
    }
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Create the config file
    Init {
        /// Git remote holding the notes repository
        #[arg(long, value_name = "URL")]
        remote_url: String,

        /// Local clone directory (default: <data dir>/terminotes)
        #[arg(long, value_name = "PATH")]
        dir: Option<String>,

        /// Editor command
        #[arg(long)]
        editor: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the loaded configuration
    Show,
    /// Print the config file path
    Path,
}

/// Supported shells for completion
#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tn").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn sync_dry_run_short_flag() {
        let cli = parse(&["sync", "-d"]);
        assert!(matches!(cli.command, Command::Sync { dry_run: true }));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["sync", "--config", "/tmp/c.toml", "--debug"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(cli.debug);
    }

    #[test]
    fn interactive_resolution() {
        assert!(parse(&["--interactive", "sync"]).interactive_with_tty(false));
        assert!(!parse(&["--no-interactive", "sync"]).interactive_with_tty(true));
        assert!(!parse(&["-q", "sync"]).interactive_with_tty(true));
        assert!(parse(&["sync"]).interactive_with_tty(true));
        assert!(!parse(&["sync"]).interactive_with_tty(false));
    }

    #[test]
    fn interactive_flags_conflict() {
        assert!(Cli::try_parse_from(["tn", "--interactive", "--no-interactive", "sync"]).is_err());
    }

    #[test]
    fn record_parses_action_and_id() {
        let cli = parse(&["record", "update", "42"]);
        match cli.command {
            Command::Record { action, note_id } => {
                assert_eq!(action, RecordAction::Update);
                assert_eq!(note_id, Some(42));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn config_init_requires_remote() {
        assert!(Cli::try_parse_from(["tn", "config", "init"]).is_err());
        let cli = parse(&["config", "init", "--remote-url", "git@example.com:me/notes.git"]);
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Init { force: false, .. }
            }
        ));
    }
}
