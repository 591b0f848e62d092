//! core::paths
//!
//! Centralized path routing for terminotes files.
//!
//! # Locations
//!
//! - Config file, first match wins:
//!   1. `--config <path>`
//!   2. `$TERMINOTES_CONFIG`
//!   3. `$XDG_CONFIG_HOME/terminotes/config.toml`
//!   4. `<config_dir>/terminotes/config.toml` (platform config dir)
//! - Notes clone: `terminotes_dir` from the config, else
//!   `<data_dir>/terminotes`.
//!
//! The first candidate that is *set* is chosen, whether or not the file
//! exists, so `tn config init` writes where `tn sync` later reads.
//!
//! # Example
//!
//! ```
//! use terminotes::core::paths::{ConfigSources, ConfigSource};
//! use std::path::PathBuf;
//!
//! let sources = ConfigSources {
//!     explicit: None,
//!     env_override: None,
//!     xdg_config_home: Some(PathBuf::from("/home/me/.config")),
//!     platform_config_dir: None,
//! };
//! let (path, source) = sources.select().unwrap();
//! assert_eq!(path, PathBuf::from("/home/me/.config/terminotes/config.toml"));
//! assert_eq!(source, ConfigSource::XdgConfigHome);
//! ```

use std::path::{Path, PathBuf};

use super::config::ConfigError;

/// Directory name used under the config and data roots.
pub const APP_DIR: &str = "terminotes";

/// Config file name inside [`APP_DIR`].
pub const CONFIG_FILENAME: &str = "config.toml";

/// Environment variable that overrides the config location.
pub const CONFIG_ENV: &str = "TERMINOTES_CONFIG";

/// Where the config path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Flag,
    Env,
    XdgConfigHome,
    Platform,
}

impl ConfigSource {
    pub fn describe(self) -> &'static str {
        match self {
            Self::Flag => "--config",
            Self::Env => "$TERMINOTES_CONFIG",
            Self::XdgConfigHome => "$XDG_CONFIG_HOME",
            Self::Platform => "platform default",
        }
    }
}

/// Candidate config locations, gathered once from flags and environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSources {
    pub explicit: Option<PathBuf>,
    pub env_override: Option<PathBuf>,
    pub xdg_config_home: Option<PathBuf>,
    pub platform_config_dir: Option<PathBuf>,
}

impl ConfigSources {
    /// Read candidates from the process environment.
    ///
    /// Empty environment values count as unset.
    pub fn from_env(explicit: Option<&Path>) -> Self {
        let var = |name: &str| {
            std::env::var_os(name)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self {
            explicit: explicit.map(Path::to_path_buf),
            env_override: var(CONFIG_ENV),
            xdg_config_home: var("XDG_CONFIG_HOME"),
            platform_config_dir: dirs::config_dir(),
        }
    }

    /// Pick the config path by precedence.
    pub fn select(&self) -> Option<(PathBuf, ConfigSource)> {
        let in_app_dir = |root: &Path| root.join(APP_DIR).join(CONFIG_FILENAME);

        if let Some(path) = &self.explicit {
            return Some((path.clone(), ConfigSource::Flag));
        }
        if let Some(path) = &self.env_override {
            return Some((path.clone(), ConfigSource::Env));
        }
        if let Some(root) = &self.xdg_config_home {
            return Some((in_app_dir(root), ConfigSource::XdgConfigHome));
        }
        self.platform_config_dir
            .as_deref()
            .map(|root| (in_app_dir(root), ConfigSource::Platform))
    }
}

/// Resolve the config file path for this invocation.
///
/// # Errors
///
/// [`ConfigError::NoHomeDir`] if no candidate is available at all.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    ConfigSources::from_env(explicit)
        .select()
        .map(|(path, source)| {
            tracing::debug!(path = %path.display(), source = source.describe(), "config path selected");
            path
        })
        .ok_or(ConfigError::NoHomeDir)
}

/// Default location of the notes clone: `<data_dir>/terminotes`.
pub fn default_notes_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .ok_or(ConfigError::NoHomeDir)
}

/// Expand a leading `~/` (or a bare `~`) to the home directory.
pub fn expand_home(path: &str) -> Result<PathBuf, ConfigError> {
    if path == "~" {
        return dirs::home_dir().ok_or(ConfigError::NoHomeDir);
    }
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .ok_or(ConfigError::NoHomeDir),
        None => Ok(PathBuf::from(path)),
    }
}
