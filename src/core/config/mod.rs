//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! terminotes has a single user-level config file holding a `[terminotes]`
//! table. Its location is resolved by [`crate::core::paths::config_path`].
//! There is no repository-level config; the notes clone is owned entirely
//! by the tool.
//!
//! # Example
//!
//! ```no_run
//! use terminotes::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("Remote: {}", config.remote_url());
//! println!("Clone: {}", config.notes_dir().unwrap().display());
//! ```

pub mod schema;

pub use schema::{ConfigFile, TerminotesSection};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::paths;
use super::storage::SqliteFile;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "Configuration not found at '{path}'. Run 'tn config init --remote-url <url>' to create one."
    )]
    NotFound { path: PathBuf },

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("config file '{path}' has no [terminotes] table")]
    MissingSection { path: PathBuf },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config file '{path}' already exists; pass --force to overwrite")]
    AlreadyExists { path: PathBuf },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded, validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    section: TerminotesSection,
    path: PathBuf,
}

impl Config {
    /// Load configuration from the resolved location.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NotFound`] if no file exists at the resolved path
    /// - [`ConfigError::ParseError`] / [`ConfigError::MissingSection`] for bad contents
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = paths::config_path(explicit)?;
        Self::load_from(&path)
    }

    /// Load and validate the file at `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let section = file.terminotes.ok_or_else(|| ConfigError::MissingSection {
            path: path.to_path_buf(),
        })?;
        section.validate()?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(Self {
            section,
            path: path.to_path_buf(),
        })
    }

    /// Build a config in memory (used by `config init` and tests).
    pub fn from_section(section: TerminotesSection, path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        section.validate()?;
        Ok(Self {
            section,
            path: path.into(),
        })
    }

    /// Write a config file atomically.
    ///
    /// Creates parent directories if needed. Refuses to replace an existing
    /// file unless `force` is set.
    pub fn write(path: &Path, section: &TerminotesSection, force: bool) -> Result<(), ConfigError> {
        section.validate()?;
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }
        let file = ConfigFile {
            terminotes: Some(section.clone()),
        };
        write_config_atomic(path, &file)
    }

    pub fn section(&self) -> &TerminotesSection {
        &self.section
    }

    /// The remote the notes clone must track.
    pub fn remote_url(&self) -> &str {
        &self.section.git_remote_url
    }

    /// Directory of the local clone.
    ///
    /// Defaults to `<data_dir>/terminotes` if not configured.
    pub fn notes_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.section.terminotes_dir {
            Some(dir) => paths::expand_home(dir),
            None => paths::default_notes_dir(),
        }
    }

    /// The notes database inside the clone.
    pub fn database(&self) -> Result<SqliteFile, ConfigError> {
        Ok(SqliteFile::in_dir(&self.notes_dir()?))
    }

    pub fn editor(&self) -> Option<&str> {
        self.section.editor.as_deref()
    }

    pub fn allowed_tags(&self) -> &[String] {
        &self.section.allowed_tags
    }

    /// Get the path the config was loaded from.
    pub fn loaded_from(&self) -> &Path {
        &self.path
    }

    /// Render the `[terminotes]` table as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        let file = ConfigFile {
            terminotes: Some(self.section.clone()),
        };
        toml::to_string_pretty(&file).map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }
}

/// Write to a sibling temp file, then rename over `path`.
fn write_config_atomic<T: serde::Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let contents =
        toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

    let temp_path = path.with_extension("toml.tmp");
    let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
        path: temp_path.clone(),
        source: e,
    })?;

    file.write_all(contents.as_bytes())
        .map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

    file.sync_all().map_err(|e| ConfigError::WriteError {
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
