//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - The injected conflict-resolution prompt
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All output and prompts go through this module so quiet mode and
//! interactive vs non-interactive sessions are handled in one place.

pub mod output;
pub mod prompts;
