//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Layout
//!
//! ```toml
//! [terminotes]
//! git_remote_url = "git@github.com:me/notes.git"
//! terminotes_dir = "~/notes"        # optional
//! editor = "nvim"                   # optional
//! allowed_tags = ["work", "idea"]   # optional
//! ```
//!
//! Unknown keys inside `[terminotes]` are rejected. Other top-level tables
//! belong to export plugins and are ignored here.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// The whole config file.
///
/// Not `deny_unknown_fields`: plugin tables live alongside `[terminotes]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminotes: Option<TerminotesSection>,
}

/// The `[terminotes]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TerminotesSection {
    /// Remote the notes repository is cloned from and synced to.
    pub git_remote_url: String,

    /// Local clone directory; `~/` is expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminotes_dir: Option<String>,

    /// Editor command for note bodies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_tags: Vec<String>,
}

impl TerminotesSection {
    pub fn new(git_remote_url: impl Into<String>) -> Self {
        Self {
            git_remote_url: git_remote_url.into(),
            terminotes_dir: None,
            editor: None,
            allowed_tags: Vec::new(),
        }
    }

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.git_remote_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "git_remote_url cannot be empty".to_string(),
            ));
        }
        if self.git_remote_url.starts_with('-') {
            return Err(ConfigError::InvalidValue(format!(
                "git_remote_url '{}' looks like a command-line option",
                self.git_remote_url
            )));
        }

        if let Some(dir) = &self.terminotes_dir {
            if dir.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "terminotes_dir cannot be empty".to_string(),
                ));
            }
        }

        if let Some(tag) = self.allowed_tags.iter().find(|t| t.trim().is_empty()) {
            return Err(ConfigError::InvalidValue(format!(
                "allowed_tags contains an empty tag: {tag:?}"
            )));
        }

        Ok(())
    }
}
