//! core
//!
//! Core domain types, configuration and path routing for terminotes.
//!
//! # Modules
//!
//! - [`types`] - Strong types: BranchName, Oid, DivergenceState, etc.
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Config and data location routing
//! - [`storage`] - The database file the sync engine tracks
//!
//! Nothing in here runs git; see [`crate::git`].

pub mod config;
pub mod paths;
pub mod storage;
pub mod types;
