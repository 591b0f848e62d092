//! terminotes - terminal notes kept in a SQLite file, synchronized through git
//!
//! The notes database is a single binary file inside a local clone of a
//! git remote. Every note mutation becomes one local commit; `tn sync`
//! reconciles the clone with the remote without ever merging the file.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates)
//! - [`engine`] - Sync orchestration and conflict resolution
//! - [`git`] - Single interface for all git operations
//! - [`core`] - Domain types, configuration and paths
//! - [`ui`] - Output and the injected resolution prompt
//!
//! # Correctness Invariants
//!
//! 1. Commits never touch the network
//! 2. Sync refuses to run on a dirty worktree
//! 3. Destructive resolutions require an explicit user choice
//! 4. Forced pushes are leased on the remote tip seen at fetch time

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod ui;
