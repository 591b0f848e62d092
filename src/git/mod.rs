//! git
//!
//! Single interface for all version-control operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to git. Every clone, commit, fetch,
//! push and reset flows through [`Git`], which describes each invocation as
//! a [`GitCommand`] and hands it to a [`ProcessRunner`]. No other module
//! spawns processes or reads `.git` internals.
//!
//! # Responsibilities
//!
//! - Local clone lifecycle and validity checks ([`repo`])
//! - Recording database mutations as local commits ([`commit`])
//! - Fetching and classifying divergence ([`remote`])
//! - Push and reset primitives used by resolution ([`remote`])
//!
//! # Invariants
//!
//! - The only remote is `origin`, and it must equal the configured URL
//! - Commits never touch the network
//! - Forced pushes always carry a lease on the observed remote tip
//!
//! # Example
//!
//! ```ignore
//! use terminotes::git::{Git, RepositoryHandle};
//!
//! let git = Git::system(RepositoryHandle::new("/home/me/.local/share/terminotes", url));
//! git.ensure_local_clone()?;
//! git.fetch_prune()?;
//! let snapshot = git.remote_snapshot()?;
//! println!("{}", snapshot.state);
//! ```

pub mod commit;
mod error;
pub mod mock;
pub mod remote;
pub mod repo;
mod runner;

pub use commit::{record_mutation, CommitStatus};
pub use error::{CommitWarning, ErrorKind, GitSyncError};
pub use remote::{
    force_push_with_lease_command, hard_reset_command, push_command, push_set_upstream_command,
    RemoteSnapshot, Upstream,
};
pub use repo::{CloneStatus, Git, RepositoryHandle, REMOTE_NAME};
pub use runner::{GitCommand, ProcessOutput, ProcessRunner, RunnerError, SystemRunner, GIT_PROGRAM};
